use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::CoreResult;
use crate::types::{AuditRecord, PermissionLogEntry};

// ---------------------------------------------------------------------------
// AuditLog — append-only audit trail
//
// Writes are best-effort from the engine's point of view: a failed append
// is logged by the caller and never reverses an access decision.
// ---------------------------------------------------------------------------

pub trait AuditLog: Send + Sync {
    fn append(&self, record: AuditRecord) -> CoreResult<()>;

    /// Most recent entries, newest first, at most `limit`.
    fn recent(&self, limit: usize) -> CoreResult<Vec<AuditRecord>>;
}

// ---------------------------------------------------------------------------
// PermissionLedger — append-only DAC grant/revoke history
// ---------------------------------------------------------------------------

pub trait PermissionLedger: Send + Sync {
    fn append(&self, entry: PermissionLogEntry) -> CoreResult<()>;
}

// ---------------------------------------------------------------------------
// AlertSink — durable alert persistence (file, table, SIEM forwarder)
// ---------------------------------------------------------------------------

pub trait AlertSink: Send + Sync {
    /// Append one serialized alert line. Best-effort; failure must not
    /// prevent the in-memory alert from being recorded.
    fn append(&self, alert_json: &str) -> CoreResult<()>;
}

// ---------------------------------------------------------------------------
// SettingsStore — single key/value setting persistence
// ---------------------------------------------------------------------------

pub trait SettingsStore: Send + Sync {
    fn get(&self, key: &str) -> CoreResult<Option<String>>;
    fn put(&self, key: &str, value: &str) -> CoreResult<()>;
}

// ---------------------------------------------------------------------------
// In-memory implementations for testing and embedding
// ---------------------------------------------------------------------------

/// In-memory audit log, newest entries first.
#[derive(Default)]
pub struct InMemoryAuditLog {
    records: Mutex<Vec<AuditRecord>>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().expect("audit log lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditLog for InMemoryAuditLog {
    fn append(&self, record: AuditRecord) -> CoreResult<()> {
        self.records
            .lock()
            .expect("audit log lock poisoned")
            .insert(0, record);
        Ok(())
    }

    fn recent(&self, limit: usize) -> CoreResult<Vec<AuditRecord>> {
        let records = self.records.lock().expect("audit log lock poisoned");
        Ok(records.iter().take(limit).cloned().collect())
    }
}

/// In-memory permission ledger.
#[derive(Default)]
pub struct InMemoryPermissionLedger {
    entries: Mutex<Vec<PermissionLogEntry>>,
}

impl InMemoryPermissionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<PermissionLogEntry> {
        self.entries
            .lock()
            .expect("ledger lock poisoned")
            .clone()
    }
}

impl PermissionLedger for InMemoryPermissionLedger {
    fn append(&self, entry: PermissionLogEntry) -> CoreResult<()> {
        self.entries
            .lock()
            .expect("ledger lock poisoned")
            .push(entry);
        Ok(())
    }
}

/// In-memory alert sink collecting serialized lines.
#[derive(Default)]
pub struct InMemoryAlertSink {
    lines: Mutex<Vec<String>>,
}

impl InMemoryAlertSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().expect("alert sink lock poisoned").clone()
    }
}

impl AlertSink for InMemoryAlertSink {
    fn append(&self, alert_json: &str) -> CoreResult<()> {
        self.lines
            .lock()
            .expect("alert sink lock poisoned")
            .push(alert_json.to_string());
        Ok(())
    }
}

/// In-memory settings store.
#[derive(Default)]
pub struct InMemorySettingsStore {
    values: Mutex<HashMap<String, String>>,
}

impl InMemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a value directly, bypassing the authoritative update path.
    /// Intended for tests that simulate preexisting persisted state.
    pub fn seed(&self, key: &str, value: &str) {
        self.values
            .lock()
            .expect("settings lock poisoned")
            .insert(key.to_string(), value.to_string());
    }
}

impl SettingsStore for InMemorySettingsStore {
    fn get(&self, key: &str) -> CoreResult<Option<String>> {
        Ok(self
            .values
            .lock()
            .expect("settings lock poisoned")
            .get(key)
            .cloned())
    }

    fn put(&self, key: &str, value: &str) -> CoreResult<()> {
        self.values
            .lock()
            .expect("settings lock poisoned")
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AuditStatus, SubjectId};

    // Verify the trait objects are object-safe
    fn _assert_audit_object_safe(_: &dyn AuditLog) {}
    fn _assert_ledger_object_safe(_: &dyn PermissionLedger) {}
    fn _assert_sink_object_safe(_: &dyn AlertSink) {}
    fn _assert_settings_object_safe(_: &dyn SettingsStore) {}

    fn make_record(action: &str) -> AuditRecord {
        AuditRecord::new(
            SubjectId::new("u1"),
            "alice",
            action,
            "details",
            AuditStatus::Success,
            "127.0.0.1",
        )
    }

    #[test]
    fn test_audit_log_recent_newest_first() {
        let log = InMemoryAuditLog::new();
        log.append(make_record("FIRST")).unwrap();
        log.append(make_record("SECOND")).unwrap();

        let recent = log.recent(10).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].action, "SECOND");
        assert_eq!(recent[1].action, "FIRST");
    }

    #[test]
    fn test_audit_log_recent_respects_limit() {
        let log = InMemoryAuditLog::new();
        for _ in 0..5 {
            log.append(make_record("A")).unwrap();
        }
        assert_eq!(log.recent(3).unwrap().len(), 3);
    }

    #[test]
    fn test_settings_roundtrip() {
        let store = InMemorySettingsStore::new();
        assert!(store.get("accessModel").unwrap().is_none());
        store.put("accessModel", "MAC").unwrap();
        assert_eq!(store.get("accessModel").unwrap().as_deref(), Some("MAC"));
    }

    #[test]
    fn test_alert_sink_collects_lines() {
        let sink = InMemoryAlertSink::new();
        sink.append("{\"a\":1}").unwrap();
        assert_eq!(sink.lines(), vec!["{\"a\":1}".to_string()]);
    }
}
