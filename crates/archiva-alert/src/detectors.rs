//! Pure detection passes over audit history.
//!
//! Each detector takes a slice of audit records (newest first, as
//! returned by `AuditLog::recent`), the configured thresholds, and the
//! reference instant, and returns the alerts it would raise. Detectors
//! emit at most one alert per partition per call; dedup across calls
//! is the caller's concern.

use std::collections::BTreeMap;

use archiva_core::{actions, AuditRecord, AuditStatus, Timestamp};

use crate::types::{Alert, AlertKind, AlertSeverity, DetectorThresholds};

/// Failed-login clustering per (address, username) pair.
pub fn detect_brute_force(
    records: &[AuditRecord],
    thresholds: &DetectorThresholds,
    now: Timestamp,
) -> Vec<Alert> {
    let cutoff = now.minus_minutes(thresholds.brute_force_window_minutes);
    let mut partitions: BTreeMap<(String, String), Vec<&AuditRecord>> = BTreeMap::new();
    for record in records {
        if record.action == actions::LOGIN_FAILED && record.timestamp >= cutoff {
            partitions
                .entry((record.address.clone(), record.username.clone()))
                .or_default()
                .push(record);
        }
    }

    let mut alerts = Vec::new();
    for ((address, username), hits) in partitions {
        if hits.len() < thresholds.failed_login_threshold {
            continue;
        }
        let newest = hits[0];
        let alert = Alert::new(
            AlertKind::BruteForce,
            AlertSeverity::Critical,
            format!(
                "Brute force attack detected: {} failed login attempts from {}",
                hits.len(),
                address
            ),
            serde_json::json!({
                "address": address,
                "username": username,
                "attempt_count": hits.len(),
                "window_minutes": thresholds.brute_force_window_minutes,
            }),
        )
        .for_subject(newest.subject_id.clone(), username.clone())
        .at(now);
        alerts.push(alert);
    }
    alerts
}

/// Repeated denied file accesses per subject.
pub fn detect_suspicious_access(
    records: &[AuditRecord],
    thresholds: &DetectorThresholds,
    now: Timestamp,
) -> Vec<Alert> {
    let cutoff = now.minus_minutes(thresholds.suspicious_window_minutes);
    let mut partitions: BTreeMap<String, Vec<&AuditRecord>> = BTreeMap::new();
    for record in records {
        if record.action == actions::FILE_ACCESS
            && record.status == AuditStatus::Denied
            && record.timestamp >= cutoff
        {
            partitions
                .entry(record.subject_id.as_str().to_owned())
                .or_default()
                .push(record);
        }
    }

    let mut alerts = Vec::new();
    for (subject_id, hits) in partitions {
        if hits.len() < thresholds.suspicious_access_threshold {
            continue;
        }
        let newest = hits[0];
        let alert = Alert::new(
            AlertKind::SuspiciousActivity,
            AlertSeverity::High,
            format!(
                "Suspicious access pattern: {} denied access attempts",
                hits.len()
            ),
            serde_json::json!({
                "subject_id": subject_id,
                "denied_count": hits.len(),
                "window_minutes": thresholds.suspicious_window_minutes,
            }),
        )
        .for_subject(newest.subject_id.clone(), newest.username.clone())
        .at(now);
        alerts.push(alert);
    }
    alerts
}

/// Behavioural anomalies over the most recent slice of history:
/// after-hours activity and bursts of role changes. Unlike the two
/// windowed detectors these look at entry count, not wall-clock age.
pub fn detect_anomalies(
    records: &[AuditRecord],
    thresholds: &DetectorThresholds,
    now: Timestamp,
) -> Vec<Alert> {
    let slice = &records[..records.len().min(thresholds.anomaly_slice_len)];
    let mut alerts = Vec::new();

    // After-hours volume only counts as anomalous while it is actually
    // after hours; the same history seen next morning is stale news.
    let after_hours = slice
        .iter()
        .filter(|r| thresholds.is_after_hours(r.timestamp.hour_of_day()))
        .count();
    if thresholds.is_after_hours(now.hour_of_day()) && after_hours > thresholds.after_hours_threshold {
        alerts.push(
            Alert::new(
                AlertKind::AnomalyDetected,
                AlertSeverity::Medium,
                "Unusual after-hours access pattern detected",
                serde_json::json!({
                    "after_hours_count": after_hours,
                    "slice_len": slice.len(),
                }),
            )
            .at(now),
        );
    }

    let role_changes = slice
        .iter()
        .filter(|r| {
            r.action == actions::ROLE_ASSIGN || r.action == actions::ROLE_REQUEST_APPROVE
        })
        .count();
    if role_changes > thresholds.role_change_threshold {
        alerts.push(
            Alert::new(
                AlertKind::AnomalyDetected,
                AlertSeverity::High,
                "Unusual number of role changes detected",
                serde_json::json!({
                    "role_change_count": role_changes,
                    "slice_len": slice.len(),
                }),
            )
            .at(now),
        );
    }

    alerts
}
