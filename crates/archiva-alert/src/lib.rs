//! Archiva alerting pipeline.
//!
//! Mines bounded slices of the audit trail for brute-force, suspicious-
//! access, and anomalous-behavior patterns. Detectors are pure functions
//! over a log slice; emitted alerts land in a bounded in-memory store,
//! a durable append sink, and the audit trail itself. One idempotent
//! [`AlertPipeline::run_detectors`] serves both schedulers: the periodic
//! sweep (overlap-suppressed) and the synchronous post-denial hook.

pub mod detectors;
pub mod error;
pub mod pipeline;
pub mod store;
pub mod types;

pub use error::{AlertError, AlertResult};
pub use pipeline::{spawn_periodic_sweep, AlertPipeline, SweepHandle};
pub use store::AlertStore;
pub use types::{Alert, AlertKind, AlertSeverity, DetectorThresholds};
