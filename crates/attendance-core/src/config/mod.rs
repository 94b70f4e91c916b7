use crate::policy::PolicyConfig;
use std::env;
use std::fmt;
use std::path::PathBuf;

const DEFAULT_DATA_FILE: &str = "attendance-data.json";

/// Distinguishes runtime behavior for different stages of the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub storage: StorageConfig,
    pub telemetry: TelemetryConfig,
    pub policy: PolicyConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let data_file = env::var("ATTENDANCE_DATA_FILE")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE));
        let auto_backup = flag("ATTENDANCE_AUTO_BACKUP")?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let policy = PolicyConfig {
            probation_no_call_no_show_removal: flag("ATTENDANCE_PROBATION_NCNS_REMOVAL")?,
            ..PolicyConfig::default()
        };

        Ok(Self {
            environment,
            storage: StorageConfig {
                data_file,
                auto_backup,
            },
            telemetry: TelemetryConfig { log_level },
            policy,
        })
    }
}

/// Where the roster document lives.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_file: PathBuf,
    pub auto_backup: bool,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

fn flag(name: &'static str) -> Result<bool, ConfigError> {
    let Ok(raw) = env::var(name) else {
        return Ok(false);
    };

    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "0" | "false" | "no" | "off" => Ok(false),
        "1" | "true" | "yes" | "on" => Ok(true),
        _ => Err(ConfigError::InvalidFlag { name, value: raw }),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidFlag { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidFlag { name, value } => {
                write!(f, "{name} must be true or false (got '{value}')")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("APP_ENV");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("ATTENDANCE_DATA_FILE");
        env::remove_var("ATTENDANCE_AUTO_BACKUP");
        env::remove_var("ATTENDANCE_PROBATION_NCNS_REMOVAL");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.storage.data_file, PathBuf::from(DEFAULT_DATA_FILE));
        assert!(!config.storage.auto_backup);
        assert_eq!(config.telemetry.log_level, "info");
        assert!(!config.policy.probation_no_call_no_show_removal);
        assert_eq!(config.policy.no_call_no_show_window_days, 365);
    }

    #[test]
    fn flags_accept_common_spellings() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("ATTENDANCE_AUTO_BACKUP", "Yes");
        env::set_var("ATTENDANCE_PROBATION_NCNS_REMOVAL", "1");
        env::set_var("ATTENDANCE_DATA_FILE", "/srv/attendance/roster.json");
        let config = AppConfig::load().expect("config loads");
        assert!(config.storage.auto_backup);
        assert!(config.policy.probation_no_call_no_show_removal);
        assert_eq!(
            config.storage.data_file,
            PathBuf::from("/srv/attendance/roster.json")
        );
        reset_env();
    }

    #[test]
    fn rejects_unrecognized_flag_values() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("ATTENDANCE_AUTO_BACKUP", "sometimes");
        match AppConfig::load() {
            Err(ConfigError::InvalidFlag { name, value }) => {
                assert_eq!(name, "ATTENDANCE_AUTO_BACKUP");
                assert_eq!(value, "sometimes");
            }
            other => panic!("expected invalid flag, got {other:?}"),
        }
        reset_env();
    }
}
