use thiserror::Error;

/// Errors raised by policy mutations and administration.
///
/// Note the boundary: a *denied access decision* is not an error. Denials
/// travel as [`crate::AccessDecision`] values with `allowed == false`;
/// `PolicyError` is reserved for operations that could not be performed
/// at all (an unauthorized administrative call, a ledger that refused an
/// append, a settings store that failed to persist).
#[derive(Debug, Error)]
pub enum PolicyError {
    /// Administrator-only operation attempted by a non-admin subject.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("permission ledger error: {0}")]
    Ledger(String),

    #[error("settings store error: {0}")]
    Settings(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type PolicyResult<T> = Result<T, PolicyError>;
