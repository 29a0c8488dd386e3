use thiserror::Error;

/// Error type for the Archiva security kernel, aggregating errors from
/// the dependency crates.
#[derive(Debug, Error)]
pub enum KernelError {
    #[error("policy error: {0}")]
    Policy(#[from] archiva_policy::PolicyError),

    #[error("alert error: {0}")]
    Alert(#[from] archiva_alert::AlertError),

    #[error("core error: {0}")]
    Core(#[from] archiva_core::CoreError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for KernelError {
    fn from(e: serde_json::Error) -> Self {
        KernelError::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for KernelError {
    fn from(e: toml::de::Error) -> Self {
        KernelError::Config(format!("TOML parse error: {}", e))
    }
}

pub type KernelResult<T> = Result<T, KernelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = KernelError::Internal("engine down".into());
        assert_eq!(err.to_string(), "internal error: engine down");
    }

    #[test]
    fn test_from_policy() {
        let policy_err = archiva_policy::PolicyError::Unauthorized("not an administrator".into());
        let err: KernelError = policy_err.into();
        assert!(err.to_string().contains("not an administrator"));
    }

    #[test]
    fn test_from_alert() {
        let alert_err = archiva_alert::AlertError::UnknownAlert("alert_ff".into());
        let err: KernelError = alert_err.into();
        assert!(err.to_string().contains("alert_ff"));
    }

    #[test]
    fn test_from_toml() {
        let toml_err = toml::from_str::<toml::Value>("= invalid").unwrap_err();
        let err: KernelError = toml_err.into();
        assert!(matches!(err, KernelError::Config(_)));
    }

    #[test]
    fn test_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("nope").unwrap_err();
        let err: KernelError = json_err.into();
        assert!(matches!(err, KernelError::Serialization(_)));
    }
}
