use thiserror::Error;

#[derive(Debug, Error)]
pub enum AlertError {
    #[error("unknown alert: {0}")]
    UnknownAlert(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type AlertResult<T> = Result<T, AlertError>;
