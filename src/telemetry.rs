use crate::config::TelemetryConfig;
use std::env;
use std::fmt;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

const RUST_LOG: &str = "RUST_LOG";
const LEVEL_VARIABLE: &str = "INVENTORY_LOG_LEVEL";

#[derive(Debug)]
pub enum TelemetryError {
    InvalidFilter {
        variable: &'static str,
        value: String,
        source: ParseError,
    },
    Subscriber(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::InvalidFilter {
                variable, value, ..
            } => write!(f, "{variable}='{value}' is not a usable log filter"),
            TelemetryError::Subscriber(err) => {
                write!(f, "inventory log output could not be set up: {err}")
            }
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TelemetryError::InvalidFilter { source, .. } => Some(source),
            TelemetryError::Subscriber(err) => Some(&**err),
        }
    }
}

/// A non-empty `RUST_LOG` wins over the configured level; a malformed one
/// is reported rather than ignored.
pub fn build_filter(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    match env::var(RUST_LOG) {
        Ok(directives) if !directives.trim().is_empty() => parse_filter(RUST_LOG, &directives),
        _ => parse_filter(LEVEL_VARIABLE, &config.log_level),
    }
}

fn parse_filter(variable: &'static str, directives: &str) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(directives).map_err(|source| TelemetryError::InvalidFilter {
        variable,
        value: directives.to_string(),
        source,
    })
}

/// Logs go to stderr so command output on stdout stays machine-readable.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    tracing_subscriber::fmt()
        .with_env_filter(build_filter(config)?)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::Subscriber)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_filter_names_its_variable_and_value() {
        let error = parse_filter(RUST_LOG, "dealership_inventory=loud").expect_err("bad level");
        assert_eq!(
            error.to_string(),
            "RUST_LOG='dealership_inventory=loud' is not a usable log filter"
        );
    }

    #[test]
    fn configured_level_is_used_without_rust_log() {
        if env::var_os(RUST_LOG).is_some() {
            return;
        }
        let config = TelemetryConfig {
            log_level: "dealership_inventory=loud".to_string(),
        };
        let error = build_filter(&config).expect_err("filter should not parse");
        assert!(error.to_string().starts_with("INVENTORY_LOG_LEVEL="));

        let config = TelemetryConfig {
            log_level: "dealership_inventory=debug,warn".to_string(),
        };
        assert!(build_filter(&config).is_ok());
    }
}
