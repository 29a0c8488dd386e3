use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("audit log error: {0}")]
    AuditLog(String),

    #[error("permission ledger error: {0}")]
    Ledger(String),

    #[error("alert sink error: {0}")]
    AlertSink(String),

    #[error("settings store error: {0}")]
    Settings(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
