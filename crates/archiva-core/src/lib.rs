//! Archiva core vocabulary.
//!
//! Shared types for the access-control decision engine and the alerting
//! pipeline: typed identifiers, timestamps, the role/classification
//! enums, audit records, and the collaborator traits (audit log,
//! permission ledger, alert sink, settings store) that the engine
//! consumes but does not implement. Persistence, email, and token
//! handling live behind those traits, outside this workspace.

pub mod error;
pub mod traits;
pub mod types;

pub use error::{CoreError, CoreResult};
pub use traits::{
    AlertSink, AuditLog, InMemoryAlertSink, InMemoryAuditLog, InMemoryPermissionLedger,
    InMemorySettingsStore, PermissionLedger, SettingsStore,
};
pub use types::actions;
pub use types::{
    AccessModel, AlertId, AuditRecord, AuditStatus, EntryId, GrantAction, Permission,
    PermissionLogEntry, ResourceId, Role, SecurityLevel, SubjectId, Timestamp,
};
