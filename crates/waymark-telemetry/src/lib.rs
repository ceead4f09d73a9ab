//! Logging infrastructure for Waymark.
//!
//! This crate provides:
//! - Structured JSON or human-readable log output on stderr
//! - Standard event names and logging macros that stamp them
//!
//! # Usage
//!
//! ```ignore
//! use waymark_telemetry::{LogFormat, Telemetry, TelemetryConfig};
//!
//! let config = TelemetryConfig::new()
//!     .with_log_level("debug")
//!     .with_log_format(LogFormat::Pretty);
//!
//! let telemetry = Telemetry::init(config)?;
//! ```

pub mod config;
pub mod logging;

pub use config::{LogFormat, TelemetryConfig};
pub use logging::events;

use thiserror::Error;

/// Telemetry errors.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Failed to initialize logging.
    #[error("failed to initialize logging: {0}")]
    LoggingInit(String),
}

/// Telemetry handle for the running process.
#[derive(Debug)]
pub struct Telemetry {
    config: TelemetryConfig,
}

impl Telemetry {
    /// Install the global log subscriber described by `config`.
    ///
    /// Fails if a global subscriber is already installed.
    pub fn init(config: TelemetryConfig) -> Result<Self, TelemetryError> {
        logging::init_logging(&config)?;
        Ok(Self { config })
    }

    /// Get the telemetry configuration.
    pub fn config(&self) -> &TelemetryConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_quiet_json() {
        let config = TelemetryConfig::default();
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(config.ansi);
    }

    #[test]
    fn config_builder() {
        let config = TelemetryConfig::new()
            .with_log_level("waymark_router=trace")
            .with_log_format(LogFormat::Pretty)
            .with_ansi(false);

        assert_eq!(config.log_level, "waymark_router=trace");
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert!(!config.ansi);
    }

    #[test]
    fn second_init_fails() {
        // The first call may race with other tests; only the second must fail.
        let _ = Telemetry::init(TelemetryConfig::default());
        let err = Telemetry::init(TelemetryConfig::default()).unwrap_err();
        assert!(err.to_string().starts_with("failed to initialize logging"));
    }
}
