use crate::inventory::TransferMode;
use std::env;
use std::fmt;
use std::path::PathBuf;

pub const DEFAULT_INVENTORY_FILE: &str = "masterInventoryList.json";

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
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("INVENTORY_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let inventory_path = env::var("INVENTORY_FILE")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_INVENTORY_FILE));

        let transfer_mode = match env::var("INVENTORY_TRANSFER_ROLLBACK") {
            Ok(value) => {
                if parse_bool("INVENTORY_TRANSFER_ROLLBACK", &value)? {
                    TransferMode::Rollback
                } else {
                    TransferMode::NoRollback
                }
            }
            Err(_) => TransferMode::NoRollback,
        };

        let log_level = env::var("INVENTORY_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            storage: StorageConfig {
                inventory_path,
                transfer_mode,
            },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

/// Where the master inventory lives and how transfers recover.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub inventory_path: PathBuf,
    pub transfer_mode: TransferMode,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidBoolean {
        variable: &'static str,
        value: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidBoolean { variable, value } => {
                write!(f, "{variable} must be true or false, got '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

fn parse_bool(variable: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        _ => Err(ConfigError::InvalidBoolean {
            variable,
            value: value.to_string(),
        }),
    }
}

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
        env::remove_var("INVENTORY_ENV");
        env::remove_var("INVENTORY_FILE");
        env::remove_var("INVENTORY_LOG_LEVEL");
        env::remove_var("INVENTORY_TRANSFER_ROLLBACK");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(
            config.storage.inventory_path,
            PathBuf::from(DEFAULT_INVENTORY_FILE)
        );
        assert_eq!(config.storage.transfer_mode, TransferMode::NoRollback);
        assert_eq!(config.telemetry.log_level, "info");
    }

    #[test]
    fn rollback_flag_selects_transfer_mode() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("INVENTORY_TRANSFER_ROLLBACK", "TRUE");
        env::set_var("INVENTORY_FILE", "/tmp/stock.json");
        env::set_var("INVENTORY_ENV", "prod");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.storage.transfer_mode, TransferMode::Rollback);
        assert_eq!(config.storage.inventory_path, PathBuf::from("/tmp/stock.json"));
        assert_eq!(config.environment, AppEnvironment::Production);
        reset_env();
    }

    #[test]
    fn invalid_rollback_flag_is_an_error() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("INVENTORY_TRANSFER_ROLLBACK", "sometimes");
        let error = AppConfig::load().expect_err("invalid boolean");
        assert!(error.to_string().contains("INVENTORY_TRANSFER_ROLLBACK"));
        reset_env();
    }
}
