use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use archiva_core::{
    actions, AlertSink, AuditLog, AuditRecord, AuditStatus, SubjectId, Timestamp,
};

use crate::error::{AlertError, AlertResult};
use crate::types::Alert;

/// Bounded in-memory alert store with durable mirroring.
///
/// The in-memory ring is the authoritative view for `list` and
/// `acknowledge`. Every inserted alert is also forwarded to the
/// configured sink as a JSON line and mirrored into the audit trail;
/// both mirrors are best-effort and never fail the insert.
pub struct AlertStore {
    alerts: Mutex<VecDeque<Alert>>,
    capacity: usize,
    sink: Arc<dyn AlertSink>,
    audit: Arc<dyn AuditLog>,
}

impl AlertStore {
    pub fn new(capacity: usize, sink: Arc<dyn AlertSink>, audit: Arc<dyn AuditLog>) -> Self {
        Self {
            alerts: Mutex::new(VecDeque::new()),
            capacity: capacity.max(1),
            sink,
            audit,
        }
    }

    /// Record an alert. The oldest alert is evicted once the ring is
    /// full; there is no delete operation.
    pub fn insert(&self, alert: Alert) {
        match serde_json::to_string(&alert) {
            Ok(line) => {
                if let Err(err) = self.sink.append(&line) {
                    tracing::warn!(alert_id = %alert.id, %err, "alert sink append failed");
                }
            }
            Err(err) => {
                tracing::warn!(alert_id = %alert.id, %err, "alert serialization failed");
            }
        }

        let mirror = AuditRecord::new(
            alert
                .subject_id
                .clone()
                .unwrap_or_else(|| SubjectId::new("system")),
            alert.username.clone().unwrap_or_else(|| "system".to_string()),
            actions::ALERT,
            format!("{}: {}", alert.severity, alert.message),
            AuditStatus::Success,
            "127.0.0.1",
        )
        .at(alert.created_at);
        if let Err(err) = self.audit.append(mirror) {
            tracing::warn!(alert_id = %alert.id, %err, "alert audit mirror failed");
        }

        let mut alerts = self.alerts.lock().expect("alert store lock poisoned");
        alerts.push_front(alert);
        alerts.truncate(self.capacity);
    }

    /// Most recent alerts, newest first, at most `limit`.
    pub fn list(&self, limit: usize) -> Vec<Alert> {
        self.alerts
            .lock()
            .expect("alert store lock poisoned")
            .iter()
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.alerts.lock().expect("alert store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Mark an alert acknowledged. Acknowledging twice is not an error;
    /// the original acknowledgment time is kept.
    pub fn acknowledge(&self, id: &str, now: Timestamp) -> AlertResult<Alert> {
        let mut alerts = self.alerts.lock().expect("alert store lock poisoned");
        let alert = alerts
            .iter_mut()
            .find(|a| a.id.as_str() == id)
            .ok_or_else(|| AlertError::UnknownAlert(id.to_string()))?;
        if !alert.acknowledged {
            alert.acknowledged = true;
            alert.acknowledged_at = Some(now);
        }
        Ok(alert.clone())
    }
}
