//! Logging setup for applications embedding the SDK
//!
//! The SDK itself only emits `tracing` events. Applications that don't install
//! their own subscriber can use these helpers, or pass a
//! [`LogConfiguration`](crate::LogConfiguration) to the subscriber builder.

use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Environment variable selecting the logging mode
pub const LOG_MODE_ENV: &str = "ASSET_TRACKING_LOG_MODE";

/// Environment variable overriding the log filter
pub const LOG_LEVEL_ENV: &str = "ASSET_TRACKING_LOG_LEVEL";

/// Logging mode for different use cases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggingMode {
    /// No subscriber is installed
    Silent,
    /// Compact stderr output
    Development,
    /// Verbose output with thread ids and source locations
    Debug,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracingInit(String),
}

/// Installs a global `tracing` subscriber for the given mode
///
/// Fails if another global subscriber has already been set.
///
/// # Environment Variables
///
/// - `ASSET_TRACKING_LOG_LEVEL`: filter directive, e.g. `asset_tracking_subscriber=trace`
/// - `RUST_LOG`: used when the above is unset
pub fn init_logging(mode: LoggingMode) -> Result<(), LoggingError> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    match mode {
        LoggingMode::Silent => Ok(()),
        LoggingMode::Development => {
            let subscriber = Registry::default()
                .with(
                    fmt::layer()
                        .with_target(false)
                        .with_thread_names(true)
                        .compact(),
                )
                .with(create_env_filter("info"));

            subscriber
                .try_init()
                .map_err(|e| LoggingError::TracingInit(e.to_string()))
        }
        LoggingMode::Debug => {
            let subscriber = Registry::default()
                .with(
                    fmt::layer()
                        .pretty()
                        .with_thread_names(true)
                        .with_thread_ids(true)
                        .with_file(true)
                        .with_line_number(true),
                )
                .with(create_env_filter("debug"));

            subscriber
                .try_init()
                .map_err(|e| LoggingError::TracingInit(e.to_string()))
        }
    }
}

/// Initializes logging from `ASSET_TRACKING_LOG_MODE`
///
/// Accepts "development" and "debug"; anything else means silent.
pub fn init_logging_from_env() -> Result<(), LoggingError> {
    init_logging(mode_from_env())
}

/// Reads the logging mode from `ASSET_TRACKING_LOG_MODE`
pub fn mode_from_env() -> LoggingMode {
    parse_mode(std::env::var(LOG_MODE_ENV).ok().as_deref())
}

fn parse_mode(value: Option<&str>) -> LoggingMode {
    match value {
        Some("development") => LoggingMode::Development,
        Some("debug") => LoggingMode::Debug,
        _ => LoggingMode::Silent,
    }
}

fn create_env_filter(default_level: &str) -> EnvFilter {
    if let Ok(level) = std::env::var(LOG_LEVEL_ENV) {
        EnvFilter::new(level)
    } else if let Ok(rust_log) = std::env::var("RUST_LOG") {
        EnvFilter::new(rust_log)
    } else {
        EnvFilter::new(default_level)
    }
}

/// Whether a global subscriber has already been installed
pub fn is_initialized() -> bool {
    tracing::dispatcher::has_been_set()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_mode() {
        assert!(init_logging(LoggingMode::Silent).is_ok());
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!(parse_mode(Some("development")), LoggingMode::Development);
        assert_eq!(parse_mode(Some("debug")), LoggingMode::Debug);
        assert_eq!(parse_mode(Some("verbose")), LoggingMode::Silent);
        assert_eq!(parse_mode(None), LoggingMode::Silent);
    }
}
