use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

use archiva_alert::DetectorThresholds;
use archiva_core::AccessModel;
use archiva_policy::{PolicyOptions, WorkingHours};

use crate::error::{KernelError, KernelResult};

/// Access-rule configuration consumed by the RuBAC and ABAC evaluators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesConfig {
    #[serde(default = "default_start_hour")]
    pub start_hour: u32,

    #[serde(default = "default_end_hour")]
    pub end_hour: u32,

    #[serde(default = "default_true")]
    pub weekdays_only: bool,

    #[serde(default = "default_locations")]
    pub allowed_locations: Vec<String>,

    #[serde(default = "default_devices")]
    pub allowed_devices: Vec<String>,

    /// Leave requests above this many days require HR-department or
    /// Admin approval.
    #[serde(default = "default_leave_days")]
    pub leave_days_threshold: u32,

    /// Whether DAC lets administrators reach unshared resources.
    #[serde(default = "default_true")]
    pub dac_admin_override: bool,
}

fn default_start_hour() -> u32 {
    9
}

fn default_end_hour() -> u32 {
    17
}

fn default_true() -> bool {
    true
}

fn default_locations() -> Vec<String> {
    vec!["office".to_string(), "remote-vpn".to_string()]
}

fn default_devices() -> Vec<String> {
    vec!["company-laptop".to_string(), "company-mobile".to_string()]
}

fn default_leave_days() -> u32 {
    10
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            start_hour: default_start_hour(),
            end_hour: default_end_hour(),
            weekdays_only: true,
            allowed_locations: default_locations(),
            allowed_devices: default_devices(),
            leave_days_threshold: default_leave_days(),
            dac_admin_override: true,
        }
    }
}

/// Detector tuning for the alerting pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Seconds between background sweeps of the audit trail.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,

    /// How many recent audit entries each sweep inspects.
    #[serde(default = "default_sweep_slice")]
    pub sweep_slice_len: usize,

    /// In-memory alert ring capacity. Oldest alerts are evicted.
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    #[serde(default = "default_failed_login_threshold")]
    pub failed_login_threshold: usize,

    #[serde(default = "default_brute_force_window")]
    pub brute_force_window_minutes: u64,

    #[serde(default = "default_suspicious_threshold")]
    pub suspicious_access_threshold: usize,

    #[serde(default = "default_suspicious_window")]
    pub suspicious_window_minutes: u64,
}

fn default_sweep_interval() -> u64 {
    300
}

fn default_sweep_slice() -> usize {
    100
}

fn default_capacity() -> usize {
    500
}

fn default_failed_login_threshold() -> usize {
    5
}

fn default_brute_force_window() -> u64 {
    15
}

fn default_suspicious_threshold() -> usize {
    10
}

fn default_suspicious_window() -> u64 {
    30
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: default_sweep_interval(),
            sweep_slice_len: default_sweep_slice(),
            capacity: default_capacity(),
            failed_login_threshold: default_failed_login_threshold(),
            brute_force_window_minutes: default_brute_force_window(),
            suspicious_access_threshold: default_suspicious_threshold(),
            suspicious_window_minutes: default_suspicious_window(),
        }
    }
}

/// Top-level kernel configuration, loaded from a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchivaConfig {
    /// Access model used when no model has been persisted yet.
    /// One of "MAC", "DAC", "RBAC", "RuBAC", "ABAC".
    #[serde(default = "default_model")]
    pub default_model: String,

    #[serde(default)]
    pub rules: RulesConfig,

    #[serde(default)]
    pub alerts: AlertConfig,
}

fn default_model() -> String {
    "RBAC".to_string()
}

impl Default for ArchivaConfig {
    fn default() -> Self {
        Self {
            default_model: default_model(),
            rules: RulesConfig::default(),
            alerts: AlertConfig::default(),
        }
    }
}

impl ArchivaConfig {
    /// Load configuration from a TOML file. A missing file yields the
    /// default configuration.
    pub fn load(path: &Path) -> KernelResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path).map_err(KernelError::Io)?;
        let config: ArchivaConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> KernelResult<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| KernelError::Config(format!("TOML serialize error: {}", e)))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(KernelError::Io)?;
        }
        std::fs::write(path, contents).map_err(KernelError::Io)?;
        Ok(())
    }

    pub fn validate(&self) -> KernelResult<()> {
        AccessModel::from_str(&self.default_model).map_err(|e| {
            KernelError::Config(format!("invalid default_model: {}", e))
        })?;
        if self.rules.start_hour >= self.rules.end_hour {
            return Err(KernelError::Config(format!(
                "start_hour ({}) must be before end_hour ({})",
                self.rules.start_hour, self.rules.end_hour
            )));
        }
        if self.rules.end_hour > 24 {
            return Err(KernelError::Config(format!(
                "end_hour must be at most 24, got {}",
                self.rules.end_hour
            )));
        }
        if self.alerts.sweep_interval_secs == 0 {
            return Err(KernelError::Config("sweep_interval_secs must be > 0".into()));
        }
        if self.alerts.sweep_slice_len == 0 {
            return Err(KernelError::Config("sweep_slice_len must be > 0".into()));
        }
        if self.alerts.capacity == 0 {
            return Err(KernelError::Config("alert capacity must be > 0".into()));
        }
        if self.alerts.failed_login_threshold == 0
            || self.alerts.suspicious_access_threshold == 0
        {
            return Err(KernelError::Config(
                "detector thresholds must be > 0".into(),
            ));
        }
        Ok(())
    }

    /// Default model as a typed value. `validate` must have passed.
    pub fn parsed_default_model(&self) -> Option<AccessModel> {
        AccessModel::from_str(&self.default_model).ok()
    }

    pub fn policy_options(&self) -> PolicyOptions {
        PolicyOptions {
            dac_admin_override: self.rules.dac_admin_override,
            rbac_top_secret: None,
            working_hours: WorkingHours {
                start_hour: self.rules.start_hour,
                end_hour: self.rules.end_hour,
                weekdays_only: self.rules.weekdays_only,
            },
            allowed_locations: self.rules.allowed_locations.clone(),
            allowed_devices: self.rules.allowed_devices.clone(),
            leave_days_threshold: self.rules.leave_days_threshold,
        }
    }

    pub fn detector_thresholds(&self) -> DetectorThresholds {
        DetectorThresholds {
            failed_login_threshold: self.alerts.failed_login_threshold,
            brute_force_window_minutes: self.alerts.brute_force_window_minutes,
            suspicious_access_threshold: self.alerts.suspicious_access_threshold,
            suspicious_window_minutes: self.alerts.suspicious_window_minutes,
            ..DetectorThresholds::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ArchivaConfig::default();
        assert_eq!(config.default_model, "RBAC");
        assert_eq!(config.rules.start_hour, 9);
        assert_eq!(config.rules.end_hour, 17);
        assert_eq!(config.alerts.sweep_interval_secs, 300);
        assert_eq!(config.alerts.capacity, 500);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_toml() {
        let toml_str = r#"
default_model = "MAC"

[rules]
start_hour = 8
end_hour = 18
allowed_locations = ["office"]

[alerts]
sweep_interval_secs = 60
failed_login_threshold = 3
"#;
        let config: ArchivaConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.default_model, "MAC");
        assert_eq!(config.rules.start_hour, 8);
        assert_eq!(config.rules.allowed_locations, vec!["office".to_string()]);
        // Unset keys fall back to defaults.
        assert_eq!(config.rules.leave_days_threshold, 10);
        assert_eq!(config.alerts.sweep_interval_secs, 60);
        assert_eq!(config.alerts.failed_login_threshold, 3);
        assert_eq!(config.alerts.suspicious_access_threshold, 10);
    }

    #[test]
    fn test_validate_bad_model() {
        let mut config = ArchivaConfig::default();
        config.default_model = "XBAC".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_inverted_hours() {
        let mut config = ArchivaConfig::default();
        config.rules.start_hour = 18;
        config.rules.end_hour = 9;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_sweep_interval() {
        let mut config = ArchivaConfig::default();
        config.alerts.sweep_interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_file_yields_default() {
        let config = ArchivaConfig::load(Path::new("/nonexistent/archiva.toml")).unwrap();
        assert_eq!(config.default_model, "RBAC");
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("archiva.toml");

        let mut config = ArchivaConfig::default();
        config.default_model = "ABAC".into();
        config.rules.leave_days_threshold = 5;
        config.save(&path).unwrap();

        let loaded = ArchivaConfig::load(&path).unwrap();
        assert_eq!(loaded.default_model, "ABAC");
        assert_eq!(loaded.rules.leave_days_threshold, 5);
    }

    #[test]
    fn test_policy_options_mapping() {
        let mut config = ArchivaConfig::default();
        config.rules.start_hour = 7;
        config.rules.dac_admin_override = false;
        let options = config.policy_options();
        assert_eq!(options.working_hours.start_hour, 7);
        assert!(!options.dac_admin_override);
        assert!(options.rbac_top_secret.is_none());
    }

    #[test]
    fn test_detector_thresholds_mapping() {
        let mut config = ArchivaConfig::default();
        config.alerts.failed_login_threshold = 3;
        config.alerts.brute_force_window_minutes = 5;
        let thresholds = config.detector_thresholds();
        assert_eq!(thresholds.failed_login_threshold, 3);
        assert_eq!(thresholds.brute_force_window_minutes, 5);
        // Anomaly settings keep their defaults.
        assert_eq!(thresholds.anomaly_slice_len, 100);
    }
}
