//! Configuration for the data type layer.
//!
//! Supports TOML deserialization with defaults that match the strict
//! behaviour expected when validating typed connections.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level data type configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatatypeConfig {
    /// Typed connection validation.
    pub connections: ConnectionConfig,

    /// Compact wire encoding limits.
    pub wire: WireConfig,
}

/// Which casts a connection may perform without being marked explicit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CastPolicy {
    /// Only up-casts are accepted on connections (strictest).
    #[default]
    ImplicitOnly,
    /// Down-casts are accepted as well.
    AllowExplicit,
}

/// Connection validation configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Policy applied when source and destination types differ.
    pub cast_policy: CastPolicy,
}

/// Compact wire encoding configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WireConfig {
    /// Longest STRING/WSTRING (in characters) accepted by the encoder.
    pub max_string_length: u16,
}

impl Default for WireConfig {
    fn default() -> Self {
        Self {
            max_string_length: u16::MAX,
        }
    }
}

impl DatatypeConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::Parse)
    }

    /// Serialize configuration to TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File I/O error.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error.
    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("failed to serialize TOML: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DatatypeConfig::default();
        assert_eq!(config.connections.cast_policy, CastPolicy::ImplicitOnly);
        assert_eq!(config.wire.max_string_length, u16::MAX);
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
            [connections]
            cast_policy = "allow_explicit"

            [wire]
            max_string_length = 254
        "#;

        let config = DatatypeConfig::from_toml(toml).unwrap();
        assert_eq!(config.connections.cast_policy, CastPolicy::AllowExplicit);
        assert_eq!(config.wire.max_string_length, 254);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = DatatypeConfig::from_toml("[wire]\nmax_string_length = 80\n").unwrap();
        assert_eq!(config.connections.cast_policy, CastPolicy::ImplicitOnly);
        assert_eq!(config.wire.max_string_length, 80);
    }

    #[test]
    fn test_unknown_policy_rejected() {
        let result = DatatypeConfig::from_toml("[connections]\ncast_policy = \"lenient\"\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_roundtrip_toml() {
        let mut config = DatatypeConfig::default();
        config.connections.cast_policy = CastPolicy::AllowExplicit;
        let toml = config.to_toml().unwrap();
        assert!(
            toml.contains("allow_explicit"),
            "Expected 'allow_explicit' in serialized TOML: {}",
            toml
        );
        let parsed = DatatypeConfig::from_toml(&toml).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_missing_file() {
        let result = DatatypeConfig::from_file(std::path::Path::new("/nonexistent/types.toml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
