use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Timestamp — canonical time representation (seconds + nanoseconds)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp {
    pub seconds_since_epoch: u64,
    pub nanoseconds: u32,
}

impl Timestamp {
    pub fn now() -> Self {
        let now = chrono::Utc::now();
        Self {
            seconds_since_epoch: now.timestamp() as u64,
            nanoseconds: now.timestamp_subsec_nanos(),
        }
    }

    pub fn from_seconds(seconds: u64) -> Self {
        Self {
            seconds_since_epoch: seconds,
            nanoseconds: 0,
        }
    }

    pub fn to_rfc3339(&self) -> String {
        let dt =
            chrono::DateTime::from_timestamp(self.seconds_since_epoch as i64, self.nanoseconds);
        dt.map(|d| d.to_rfc3339())
            .unwrap_or_else(|| "invalid".to_string())
    }

    /// Hour of day in UTC (0-23). Time-based access rules key off this.
    pub fn hour_of_day(&self) -> u32 {
        use chrono::Timelike;
        chrono::DateTime::from_timestamp(self.seconds_since_epoch as i64, 0)
            .map(|d| d.hour())
            .unwrap_or(0)
    }

    /// True for Saturday and Sunday in UTC.
    pub fn is_weekend(&self) -> bool {
        use chrono::Datelike;
        chrono::DateTime::from_timestamp(self.seconds_since_epoch as i64, 0)
            .map(|d| {
                matches!(
                    d.weekday(),
                    chrono::Weekday::Sat | chrono::Weekday::Sun
                )
            })
            .unwrap_or(false)
    }

    /// Timestamp `minutes` before this one, saturating at the epoch.
    pub fn minus_minutes(&self, minutes: u64) -> Self {
        Self {
            seconds_since_epoch: self.seconds_since_epoch.saturating_sub(minutes * 60),
            nanoseconds: self.nanoseconds,
        }
    }
}

impl From<chrono::DateTime<chrono::Utc>> for Timestamp {
    fn from(dt: chrono::DateTime<chrono::Utc>) -> Self {
        Self {
            seconds_since_epoch: dt.timestamp() as u64,
            nanoseconds: dt.timestamp_subsec_nanos(),
        }
    }
}

// ---------------------------------------------------------------------------
// Typed identifiers — prevent stringly-typed confusion
// ---------------------------------------------------------------------------

macro_rules! define_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

define_id!(SubjectId, "Unique identifier for a subject (archive user).");
define_id!(ResourceId, "Unique identifier for an archived resource.");
define_id!(AlertId, "Unique identifier for a security alert.");
define_id!(EntryId, "Unique identifier for an audit or ledger entry.");

impl AlertId {
    /// Generate a random alert identifier.
    pub fn generate() -> Self {
        use rand::RngCore;
        let mut bytes = [0u8; 8];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(format!("alert_{}", hex::encode(bytes)))
    }
}

impl EntryId {
    /// Generate a random entry identifier.
    pub fn generate() -> Self {
        use rand::RngCore;
        let mut bytes = [0u8; 8];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }
}

// ---------------------------------------------------------------------------
// Role — the closed set of archive roles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Manager,
    Staff,
    Hr,
    It,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "ADMIN"),
            Role::Manager => write!(f, "MANAGER"),
            Role::Staff => write!(f, "STAFF"),
            Role::Hr => write!(f, "HR"),
            Role::It => write!(f, "IT"),
        }
    }
}

// ---------------------------------------------------------------------------
// SecurityLevel — three-tier classification/clearance scale
//
// The same scale serves both resource classification and subject
// clearance: access under MAC is a plain total-order comparison.
// ---------------------------------------------------------------------------

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum SecurityLevel {
    #[default]
    Public,
    Internal,
    Confidential,
}

impl SecurityLevel {
    /// Numeric level on the 1-3 scale.
    pub fn level(&self) -> u8 {
        match self {
            SecurityLevel::Public => 1,
            SecurityLevel::Internal => 2,
            SecurityLevel::Confidential => 3,
        }
    }

    /// Convert a raw numeric level, clamping out-of-range values to the
    /// nearest valid bound. Malformed-but-present data must not make the
    /// decision path panic; rejection belongs at the data-entry boundary.
    pub fn from_level(level: i64) -> Self {
        match level {
            i64::MIN..=1 => SecurityLevel::Public,
            2 => SecurityLevel::Internal,
            _ => SecurityLevel::Confidential,
        }
    }
}

impl fmt::Display for SecurityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecurityLevel::Public => write!(f, "Public"),
            SecurityLevel::Internal => write!(f, "Internal"),
            SecurityLevel::Confidential => write!(f, "Confidential"),
        }
    }
}

// ---------------------------------------------------------------------------
// AccessModel — the five supported authorization models
//
// A closed enum dispatched by a single switch. Adding a model is a
// deliberate, reviewed act, not a runtime extension point.
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessModel {
    /// Mandatory: clearance vs. classification, system-enforced.
    Mac,
    /// Discretionary: owner-controlled sharing.
    Dac,
    /// Role-based: per-role branch chain.
    Rbac,
    /// Rule-based: AND over time/location/device/business rules.
    Rubac,
    /// Attribute-based: ordered policy list, first match wins.
    Abac,
}

impl AccessModel {
    /// Wire form used in settings storage and audit details.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessModel::Mac => "MAC",
            AccessModel::Dac => "DAC",
            AccessModel::Rbac => "RBAC",
            AccessModel::Rubac => "RuBAC",
            AccessModel::Abac => "ABAC",
        }
    }
}

impl fmt::Display for AccessModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AccessModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MAC" => Ok(AccessModel::Mac),
            "DAC" => Ok(AccessModel::Dac),
            "RBAC" => Ok(AccessModel::Rbac),
            "RuBAC" => Ok(AccessModel::Rubac),
            "ABAC" => Ok(AccessModel::Abac),
            other => Err(format!("unknown access model '{}'", other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Audit trail vocabulary
// ---------------------------------------------------------------------------

/// Well-known audit action tags shared by the kernel and the detectors.
pub mod actions {
    pub const FILE_ACCESS: &str = "FILE_ACCESS";
    pub const LOGIN_FAILED: &str = "LOGIN_FAILED";
    pub const ROLE_ASSIGN: &str = "ROLE_ASSIGN";
    pub const ROLE_REQUEST_APPROVE: &str = "ROLE_REQUEST_APPROVE";
    pub const CONFIG_CHANGE: &str = "CONFIG_CHANGE";
    pub const ALERT: &str = "ALERT";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditStatus {
    Success,
    Denied,
    Error,
    Pending,
}

impl fmt::Display for AuditStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditStatus::Success => write!(f, "SUCCESS"),
            AuditStatus::Denied => write!(f, "DENIED"),
            AuditStatus::Error => write!(f, "ERROR"),
            AuditStatus::Pending => write!(f, "PENDING"),
        }
    }
}

/// One entry in the audit trail. The alerting detectors consume bounded
/// slices of these, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: EntryId,
    pub timestamp: Timestamp,
    pub subject_id: SubjectId,
    pub username: String,
    /// Action tag, e.g. "FILE_ACCESS", "LOGIN_FAILED", "CONFIG_CHANGE".
    pub action: String,
    pub details: String,
    pub status: AuditStatus,
    /// Source address of the request, "127.0.0.1" when unknown.
    pub address: String,
}

impl AuditRecord {
    pub fn new(
        subject_id: SubjectId,
        username: impl Into<String>,
        action: impl Into<String>,
        details: impl Into<String>,
        status: AuditStatus,
        address: impl Into<String>,
    ) -> Self {
        Self {
            id: EntryId::generate(),
            timestamp: Timestamp::now(),
            subject_id,
            username: username.into(),
            action: action.into(),
            details: details.into(),
            status,
            address: address.into(),
        }
    }

    pub fn at(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = timestamp;
        self
    }
}

// ---------------------------------------------------------------------------
// Permission ledger vocabulary (DAC grant/revoke history)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Read,
    Write,
    Delete,
    Share,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GrantAction {
    Grant,
    Revoke,
}

/// Append-only record of a discretionary grant or revocation. The ledger
/// is never rewritten; revocation is a new entry, not an edit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionLogEntry {
    pub id: EntryId,
    pub resource_id: ResourceId,
    pub grantor: SubjectId,
    pub grantee: SubjectId,
    pub permissions: Vec<Permission>,
    pub action: GrantAction,
    pub timestamp: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_ordering() {
        let t1 = Timestamp::from_seconds(100);
        let t2 = Timestamp::from_seconds(200);
        assert!(t1 < t2);
    }

    #[test]
    fn test_timestamp_hour_of_day() {
        // 1970-01-01T00:00:00Z plus 20 hours
        let t = Timestamp::from_seconds(20 * 3600);
        assert_eq!(t.hour_of_day(), 20);
    }

    #[test]
    fn test_timestamp_weekend() {
        // 1970-01-01 was a Thursday; +2 days is Saturday.
        let thursday = Timestamp::from_seconds(12 * 3600);
        let saturday = Timestamp::from_seconds(2 * 86_400 + 12 * 3600);
        assert!(!thursday.is_weekend());
        assert!(saturday.is_weekend());
    }

    #[test]
    fn test_timestamp_minus_minutes_saturates() {
        let t = Timestamp::from_seconds(60);
        assert_eq!(t.minus_minutes(5).seconds_since_epoch, 0);
    }

    #[test]
    fn test_security_level_ordering() {
        assert!(SecurityLevel::Public < SecurityLevel::Internal);
        assert!(SecurityLevel::Internal < SecurityLevel::Confidential);
    }

    #[test]
    fn test_security_level_clamping() {
        assert_eq!(SecurityLevel::from_level(-4), SecurityLevel::Public);
        assert_eq!(SecurityLevel::from_level(0), SecurityLevel::Public);
        assert_eq!(SecurityLevel::from_level(1), SecurityLevel::Public);
        assert_eq!(SecurityLevel::from_level(2), SecurityLevel::Internal);
        assert_eq!(SecurityLevel::from_level(3), SecurityLevel::Confidential);
        assert_eq!(SecurityLevel::from_level(99), SecurityLevel::Confidential);
    }

    #[test]
    fn test_access_model_roundtrip() {
        for model in [
            AccessModel::Mac,
            AccessModel::Dac,
            AccessModel::Rbac,
            AccessModel::Rubac,
            AccessModel::Abac,
        ] {
            assert_eq!(model.as_str().parse::<AccessModel>().unwrap(), model);
        }
    }

    #[test]
    fn test_access_model_unknown() {
        assert!("XBAC".parse::<AccessModel>().is_err());
    }

    #[test]
    fn test_role_wire_form() {
        let json = serde_json::to_string(&Role::Hr).unwrap();
        assert_eq!(json, "\"HR\"");
        assert_eq!(Role::It.to_string(), "IT");
    }

    #[test]
    fn test_alert_id_generate_unique() {
        let a = AlertId::generate();
        let b = AlertId::generate();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("alert_"));
    }

    #[test]
    fn test_audit_record_serde() {
        let record = AuditRecord::new(
            SubjectId::new("u1"),
            "alice",
            "FILE_ACCESS",
            "Attempted access to q3_report under RBAC",
            AuditStatus::Denied,
            "10.0.0.7",
        );
        let json = serde_json::to_string(&record).unwrap();
        let back: AuditRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.status, AuditStatus::Denied);
        assert_eq!(back.username, "alice");
    }

    #[test]
    fn test_permission_wire_form() {
        let json = serde_json::to_string(&Permission::Share).unwrap();
        assert_eq!(json, "\"share\"");
    }
}
