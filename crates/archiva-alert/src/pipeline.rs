use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use archiva_core::{AuditLog, SubjectId, Timestamp};

use crate::detectors;
use crate::error::{AlertError, AlertResult};
use crate::store::AlertStore;
use crate::types::{Alert, AlertKind, AlertSeverity, DetectorThresholds};

/// Runs the detectors over the recent audit trail and records what they
/// find. The same entry point serves the periodic sweep and the
/// synchronous post-denial check; re-running over unchanged history is
/// idempotent because a finding is suppressed while an unacknowledged
/// alert for the same pattern is still active.
pub struct AlertPipeline {
    store: Arc<AlertStore>,
    audit: Arc<dyn AuditLog>,
    thresholds: DetectorThresholds,
    sweep_slice_len: usize,
    sweep_in_flight: AtomicBool,
}

impl AlertPipeline {
    pub fn new(
        store: Arc<AlertStore>,
        audit: Arc<dyn AuditLog>,
        thresholds: DetectorThresholds,
        sweep_slice_len: usize,
    ) -> Self {
        Self {
            store,
            audit,
            thresholds,
            sweep_slice_len: sweep_slice_len.max(1),
            sweep_in_flight: AtomicBool::new(false),
        }
    }

    pub fn store(&self) -> &Arc<AlertStore> {
        &self.store
    }

    /// Run all three detectors against the recent audit trail. Returns
    /// the number of alerts actually recorded.
    pub fn run_detectors(&self) -> AlertResult<usize> {
        self.run_detectors_at(Timestamp::now())
    }

    pub fn run_detectors_at(&self, now: Timestamp) -> AlertResult<usize> {
        let records = self
            .audit
            .recent(self.sweep_slice_len)
            .map_err(|err| AlertError::Internal(err.to_string()))?;

        let mut found = detectors::detect_brute_force(&records, &self.thresholds, now);
        found.extend(detectors::detect_suspicious_access(
            &records,
            &self.thresholds,
            now,
        ));
        found.extend(detectors::detect_anomalies(&records, &self.thresholds, now));
        Ok(self.record_new(found))
    }

    /// Suspicious-access check only. Called synchronously after a denied
    /// file access so repeated probing surfaces without waiting for the
    /// next sweep.
    pub fn run_denial_check(&self) -> AlertResult<usize> {
        self.run_denial_check_at(Timestamp::now())
    }

    pub fn run_denial_check_at(&self, now: Timestamp) -> AlertResult<usize> {
        let records = self
            .audit
            .recent(self.sweep_slice_len)
            .map_err(|err| AlertError::Internal(err.to_string()))?;
        let found = detectors::detect_suspicious_access(&records, &self.thresholds, now);
        Ok(self.record_new(found))
    }

    /// One scheduled pass. Returns `None` when a previous sweep is
    /// still running; overlapping sweeps are skipped, not queued.
    pub fn sweep(&self) -> Option<usize> {
        if self
            .sweep_in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("sweep skipped, previous pass still running");
            return None;
        }
        let result = self.run_detectors();
        self.sweep_in_flight.store(false, Ordering::Release);
        match result {
            Ok(count) => Some(count),
            Err(err) => {
                tracing::warn!(%err, "sweep failed");
                Some(0)
            }
        }
    }

    /// Direct alert for an account locked after repeated failures.
    pub fn account_locked(&self, subject_id: SubjectId, username: &str, now: Timestamp) {
        let alert = Alert::new(
            AlertKind::AccountLocked,
            AlertSeverity::High,
            format!("Account locked: {username}"),
            serde_json::json!({ "username": username }),
        )
        .for_subject(subject_id, username)
        .at(now);
        self.store.insert(alert);
    }

    /// Direct alert for a security configuration change, e.g. switching
    /// the active access-control model.
    pub fn config_change(&self, subject_id: SubjectId, username: &str, detail: &str, now: Timestamp) {
        let alert = Alert::new(
            AlertKind::ConfigChange,
            AlertSeverity::Medium,
            format!("Security configuration changed: {detail}"),
            serde_json::json!({ "username": username, "detail": detail }),
        )
        .for_subject(subject_id, username)
        .at(now);
        self.store.insert(alert);
    }

    fn record_new(&self, found: Vec<Alert>) -> usize {
        let mut recorded = 0;
        for alert in found {
            if self.already_active(&alert) {
                continue;
            }
            self.store.insert(alert);
            recorded += 1;
        }
        recorded
    }

    // A finding is a duplicate while an unacknowledged alert for the
    // same pattern is still in the store.
    fn already_active(&self, candidate: &Alert) -> bool {
        self.store
            .list(self.store.len())
            .iter()
            .any(|existing| !existing.acknowledged && same_pattern(existing, candidate))
    }
}

// Two alerts describe the same ongoing pattern when they agree on the
// detector partition: (address, username) for brute force, subject id
// for suspicious access. One account hammered from two addresses is
// two brute-force patterns, not one. Anomaly alerts carry no subject
// and match on the message; direct alerts match on (kind, username).
fn same_pattern(existing: &Alert, candidate: &Alert) -> bool {
    if existing.kind != candidate.kind {
        return false;
    }
    match candidate.kind {
        AlertKind::BruteForce => {
            existing.username == candidate.username
                && existing.details.get("address") == candidate.details.get("address")
        }
        AlertKind::SuspiciousActivity => {
            existing.details.get("subject_id") == candidate.details.get("subject_id")
        }
        AlertKind::AnomalyDetected => existing.message == candidate.message,
        _ => {
            existing.username == candidate.username
                && (candidate.username.is_some() || existing.message == candidate.message)
        }
    }
}

/// Handle for the background sweep thread. Dropping it without calling
/// [`SweepHandle::shutdown`] detaches the thread.
pub struct SweepHandle {
    stop: mpsc::Sender<()>,
    thread: Option<thread::JoinHandle<()>>,
}

impl SweepHandle {
    pub fn shutdown(mut self) {
        let _ = self.stop.send(());
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// Start a background thread sweeping the pipeline every `interval`.
pub fn spawn_periodic_sweep(pipeline: Arc<AlertPipeline>, interval: Duration) -> SweepHandle {
    let (stop, ticks) = mpsc::channel::<()>();
    let thread = thread::Builder::new()
        .name("alert-sweep".to_string())
        .spawn(move || loop {
            match ticks.recv_timeout(interval) {
                Err(mpsc::RecvTimeoutError::Timeout) => {
                    if let Some(count) = pipeline.sweep() {
                        if count > 0 {
                            tracing::info!(count, "sweep recorded alerts");
                        }
                    }
                }
                Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
            }
        })
        .expect("failed to spawn sweep thread");
    SweepHandle {
        stop,
        thread: Some(thread),
    }
}
