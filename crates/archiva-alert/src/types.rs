use serde::{Deserialize, Serialize};
use std::fmt;

use archiva_core::{AlertId, SubjectId, Timestamp};

// ---------------------------------------------------------------------------
// AlertSeverity / AlertKind
// ---------------------------------------------------------------------------

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertSeverity::Low => write!(f, "LOW"),
            AlertSeverity::Medium => write!(f, "MEDIUM"),
            AlertSeverity::High => write!(f, "HIGH"),
            AlertSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertKind {
    BruteForce,
    UnauthorizedAccess,
    MultipleFailedLogins,
    AccountLocked,
    SuspiciousActivity,
    ConfigChange,
    SystemError,
    AnomalyDetected,
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertKind::BruteForce => write!(f, "BRUTE_FORCE"),
            AlertKind::UnauthorizedAccess => write!(f, "UNAUTHORIZED_ACCESS"),
            AlertKind::MultipleFailedLogins => write!(f, "MULTIPLE_FAILED_LOGINS"),
            AlertKind::AccountLocked => write!(f, "ACCOUNT_LOCKED"),
            AlertKind::SuspiciousActivity => write!(f, "SUSPICIOUS_ACTIVITY"),
            AlertKind::ConfigChange => write!(f, "CONFIG_CHANGE"),
            AlertKind::SystemError => write!(f, "SYSTEM_ERROR"),
            AlertKind::AnomalyDetected => write!(f, "ANOMALY_DETECTED"),
        }
    }
}

// ---------------------------------------------------------------------------
// Alert
// ---------------------------------------------------------------------------

/// One security alert. Created by a detector or directly by a caller
/// (e.g. the account-lockout path); mutated only by acknowledgment;
/// never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: AlertId,
    pub kind: AlertKind,
    pub severity: AlertSeverity,
    pub message: String,
    pub details: serde_json::Value,
    pub subject_id: Option<SubjectId>,
    pub username: Option<String>,
    pub created_at: Timestamp,
    pub acknowledged: bool,
    pub acknowledged_at: Option<Timestamp>,
}

impl Alert {
    pub fn new(
        kind: AlertKind,
        severity: AlertSeverity,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            id: AlertId::generate(),
            kind,
            severity,
            message: message.into(),
            details,
            subject_id: None,
            username: None,
            created_at: Timestamp::now(),
            acknowledged: false,
            acknowledged_at: None,
        }
    }

    pub fn for_subject(
        mut self,
        subject_id: SubjectId,
        username: impl Into<String>,
    ) -> Self {
        self.subject_id = Some(subject_id);
        self.username = Some(username.into());
        self
    }

    pub fn at(mut self, created_at: Timestamp) -> Self {
        self.created_at = created_at;
        self
    }
}

// ---------------------------------------------------------------------------
// DetectorThresholds
// ---------------------------------------------------------------------------

/// Detector tuning. Thresholds are configuration, not constants baked
/// into the detectors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorThresholds {
    /// Failed logins per (address, username) partition within the window.
    pub failed_login_threshold: usize,
    pub brute_force_window_minutes: u64,

    /// Denied file accesses per subject within the window.
    pub suspicious_access_threshold: usize,
    pub suspicious_window_minutes: u64,

    /// How many of the most recent entries the anomaly detector inspects.
    pub anomaly_slice_len: usize,
    /// After-hours entries in the slice above which an alert fires.
    pub after_hours_threshold: usize,
    /// Role-change entries in the slice above which an alert fires.
    pub role_change_threshold: usize,

    /// Hours outside (night_end, night_start) count as after-hours:
    /// hour < night_end or hour > night_start.
    pub night_end_hour: u32,
    pub night_start_hour: u32,
}

impl Default for DetectorThresholds {
    fn default() -> Self {
        Self {
            failed_login_threshold: 5,
            brute_force_window_minutes: 15,
            suspicious_access_threshold: 10,
            suspicious_window_minutes: 30,
            anomaly_slice_len: 100,
            after_hours_threshold: 5,
            role_change_threshold: 3,
            night_end_hour: 6,
            night_start_hour: 22,
        }
    }
}

impl DetectorThresholds {
    pub fn is_after_hours(&self, hour: u32) -> bool {
        hour < self.night_end_hour || hour > self.night_start_hour
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(AlertSeverity::Low < AlertSeverity::Critical);
        assert!(AlertSeverity::Medium < AlertSeverity::High);
    }

    #[test]
    fn test_kind_wire_form() {
        let json = serde_json::to_string(&AlertKind::BruteForce).unwrap();
        assert_eq!(json, "\"BRUTE_FORCE\"");
        assert_eq!(AlertKind::AnomalyDetected.to_string(), "ANOMALY_DETECTED");
    }

    #[test]
    fn test_alert_starts_unacknowledged() {
        let alert = Alert::new(
            AlertKind::SystemError,
            AlertSeverity::Low,
            "test",
            serde_json::json!({}),
        );
        assert!(!alert.acknowledged);
        assert!(alert.acknowledged_at.is_none());
        assert!(alert.id.as_str().starts_with("alert_"));
    }

    #[test]
    fn test_after_hours_boundaries() {
        let thresholds = DetectorThresholds::default();
        assert!(thresholds.is_after_hours(5));
        assert!(!thresholds.is_after_hours(6));
        assert!(!thresholds.is_after_hours(22));
        assert!(thresholds.is_after_hours(23));
    }

    #[test]
    fn test_alert_serde_roundtrip() {
        let alert = Alert::new(
            AlertKind::BruteForce,
            AlertSeverity::Critical,
            "Brute force attack detected",
            serde_json::json!({"ip": "10.0.0.7", "attempt_count": 5}),
        )
        .for_subject(SubjectId::new("u1"), "alice");
        let json = serde_json::to_string(&alert).unwrap();
        let back: Alert = serde_json::from_str(&json).unwrap();
        assert_eq!(back.kind, AlertKind::BruteForce);
        assert_eq!(back.username.as_deref(), Some("alice"));
    }
}
