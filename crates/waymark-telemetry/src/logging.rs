//! Structured logging with JSON or pretty output.
//!
//! Logs go to stderr so command output on stdout stays machine-readable.

use crate::{LogFormat, TelemetryConfig, TelemetryError};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Install the global subscriber for `config`.
pub fn init_logging(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    // RUST_LOG wins over the configured level
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    match config.log_format {
        LogFormat::Json => init_json_logging(filter),
        LogFormat::Pretty => init_pretty_logging(filter, config.ansi),
    }
}

fn init_json_logging(filter: EnvFilter) -> Result<(), TelemetryError> {
    let json_layer = fmt::layer()
        .json()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_current_span(false)
        .with_span_list(false)
        .flatten_event(true)
        .with_filter(filter);

    tracing_subscriber::registry()
        .with(json_layer)
        .try_init()
        .map_err(|e| TelemetryError::LoggingInit(e.to_string()))
}

fn init_pretty_logging(filter: EnvFilter, ansi: bool) -> Result<(), TelemetryError> {
    let pretty_layer = fmt::layer()
        .pretty()
        .with_writer(std::io::stderr)
        .with_ansi(ansi)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_filter(filter);

    tracing_subscriber::registry()
        .with(pretty_layer)
        .try_init()
        .map_err(|e| TelemetryError::LoggingInit(e.to_string()))
}

/// Standard log event names.
pub mod events {
    /// A route manifest has been read and parsed.
    pub const MANIFEST_LOADED: &str = "manifest_loaded";

    /// A route table has been built.
    pub const TABLE_BUILT: &str = "table_built";

    /// Building a route table failed.
    pub const TABLE_BUILD_FAILED: &str = "table_build_failed";

    /// A URL was routed to an entry.
    pub const ROUTE_MATCHED: &str = "route_matched";

    /// No entry matched a URL.
    pub const ROUTE_NOT_FOUND: &str = "route_not_found";
}

/// Helper macros for structured logging with standard fields.
///
/// These wrap the tracing macros to ensure consistent field naming.
#[macro_export]
macro_rules! log_manifest_loaded {
    ($($field:tt)*) => {
        tracing::info!(
            event = $crate::logging::events::MANIFEST_LOADED,
            $($field)*
        )
    };
}

#[macro_export]
macro_rules! log_table_built {
    ($($field:tt)*) => {
        tracing::info!(
            event = $crate::logging::events::TABLE_BUILT,
            $($field)*
        )
    };
}

#[macro_export]
macro_rules! log_table_build_failed {
    ($($field:tt)*) => {
        tracing::error!(
            event = $crate::logging::events::TABLE_BUILD_FAILED,
            $($field)*
        )
    };
}

#[macro_export]
macro_rules! log_route_matched {
    ($($field:tt)*) => {
        tracing::debug!(
            event = $crate::logging::events::ROUTE_MATCHED,
            $($field)*
        )
    };
}

#[macro_export]
macro_rules! log_route_not_found {
    ($($field:tt)*) => {
        tracing::debug!(
            event = $crate::logging::events::ROUTE_NOT_FOUND,
            $($field)*
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_format_parse() {
        assert_eq!(LogFormat::parse("json"), Some(LogFormat::Json));
        assert_eq!(LogFormat::parse("Pretty"), Some(LogFormat::Pretty));
        assert_eq!(LogFormat::parse("yaml"), None);
        assert_eq!(LogFormat::Pretty.to_string(), "pretty");
    }

    #[test]
    fn event_names_are_unique() {
        let mut names = [
            events::MANIFEST_LOADED,
            events::TABLE_BUILT,
            events::TABLE_BUILD_FAILED,
            events::ROUTE_MATCHED,
            events::ROUTE_NOT_FOUND,
        ];
        names.sort_unstable();
        let before = names.len();
        let mut unique = names.to_vec();
        unique.dedup();
        assert_eq!(unique.len(), before);
    }
}
