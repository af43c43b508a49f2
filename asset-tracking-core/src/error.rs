//! Error types for asset-tracking-core

use thiserror::Error;

/// Errors raised while loading configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required environment variable is not set
    #[error("Missing environment variable: {0}")]
    MissingEnv(&'static str),

    /// A configuration value was present but empty
    #[error("Empty value for {0}")]
    EmptyValue(&'static str),
}
