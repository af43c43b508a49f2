//! Configuration handed to the subscriber builder

use crate::error::ConfigError;
use crate::logging::LoggingMode;

/// Environment variable holding the realtime service API key
pub const API_KEY_ENV: &str = "ASSET_TRACKING_API_KEY";

/// Environment variable holding the client id used on the realtime service
pub const CLIENT_ID_ENV: &str = "ASSET_TRACKING_CLIENT_ID";

/// Credentials and identity used to connect to the realtime service
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfiguration {
    pub api_key: String,
    pub client_id: String,
}

impl ConnectionConfiguration {
    pub fn new(api_key: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            client_id: client_id.into(),
        }
    }

    /// Creates a configuration with a random v4 UUID as client id
    pub fn with_generated_client_id(api_key: impl Into<String>) -> Self {
        Self::new(api_key, uuid::Uuid::new_v4().to_string())
    }

    /// Loads the configuration from the environment
    ///
    /// `ASSET_TRACKING_API_KEY` is required. `ASSET_TRACKING_CLIENT_ID` is
    /// optional and defaults to a generated id.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_key = lookup(API_KEY_ENV).ok_or(ConfigError::MissingEnv(API_KEY_ENV))?;
        if api_key.trim().is_empty() {
            return Err(ConfigError::EmptyValue(API_KEY_ENV));
        }

        match lookup(CLIENT_ID_ENV) {
            Some(client_id) if !client_id.trim().is_empty() => Ok(Self::new(api_key, client_id)),
            _ => Ok(Self::with_generated_client_id(api_key)),
        }
    }
}

// Keeps the API key out of logs.
impl std::fmt::Debug for ConnectionConfiguration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfiguration")
            .field("api_key", &"<redacted>")
            .field("client_id", &self.client_id)
            .finish()
    }
}

/// How the SDK should set up logging when the builder starts a subscriber
#[derive(Debug, Clone, Copy)]
pub struct LogConfiguration {
    pub mode: LoggingMode,
}

impl LogConfiguration {
    pub fn new(mode: LoggingMode) -> Self {
        Self { mode }
    }
}

impl Default for LogConfiguration {
    fn default() -> Self {
        Self {
            mode: LoggingMode::Silent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_from_lookup_reads_both_values() {
        let config = ConnectionConfiguration::from_lookup(lookup(&[
            (API_KEY_ENV, "key:secret"),
            (CLIENT_ID_ENV, "courier-7"),
        ]))
        .unwrap();

        assert_eq!(config.api_key, "key:secret");
        assert_eq!(config.client_id, "courier-7");
    }

    #[test]
    fn test_missing_api_key() {
        let result = ConnectionConfiguration::from_lookup(lookup(&[(CLIENT_ID_ENV, "x")]));
        assert_eq!(result, Err(ConfigError::MissingEnv(API_KEY_ENV)));
    }

    #[test]
    fn test_blank_api_key() {
        let result = ConnectionConfiguration::from_lookup(lookup(&[(API_KEY_ENV, "  ")]));
        assert_eq!(result, Err(ConfigError::EmptyValue(API_KEY_ENV)));
    }

    #[test]
    fn test_client_id_is_generated_when_absent() {
        let config =
            ConnectionConfiguration::from_lookup(lookup(&[(API_KEY_ENV, "key:secret")])).unwrap();
        assert!(uuid::Uuid::parse_str(&config.client_id).is_ok());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = ConnectionConfiguration::new("key:secret", "courier-7");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("courier-7"));
    }
}
