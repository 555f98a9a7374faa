//! Core error types for statscout.
//!
//! This module defines the central error type shared by the workspace crates
//! and the configuration-specific error type.

use thiserror::Error;

/// Central error type for statscout operations outside a specific subsystem.
#[derive(Error, Debug)]
pub enum StatscoutError {
    /// Configuration errors (file loading, parsing, validation)
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors (invalid input, constraints)
    #[error("validation error: {0}")]
    Validation(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to determine config directory path
    #[error("could not determine config directory (XDG base directories not available)")]
    NoConfigDir,

    /// Failed to parse TOML
    #[error("failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Failed to serialize config
    #[error("failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// I/O error reading/writing config
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration value
    #[error("invalid config value for {field}: {reason}")]
    InvalidValue {
        /// Field name
        field: String,
        /// Reason for invalidity
        reason: String,
    },
}

/// Result type alias using `StatscoutError`.
pub type Result<T> = std::result::Result<T, StatscoutError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StatscoutError::Validation("empty filter name".to_string());
        assert_eq!(err.to_string(), "validation error: empty filter name");

        let err = ConfigError::InvalidValue {
            field: "scraping.wait_timeout_ms".to_string(),
            reason: "must be greater than zero".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid config value for scraping.wait_timeout_ms: must be greater than zero"
        );
    }

    #[test]
    fn test_error_from_config() {
        let err: StatscoutError = ConfigError::NoConfigDir.into();
        assert!(matches!(err, StatscoutError::Config(_)));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: StatscoutError = io_err.into();
        assert!(matches!(err, StatscoutError::Io(_)));
    }
}
