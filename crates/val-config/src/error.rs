//! Error types for category declarations

use std::path::PathBuf;
use thiserror::Error;
use val_core::ErrorCode;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse YAML in {path}: {source}")]
    ParseYaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A single field holds a value that cannot be used
    #[error("invalid configuration value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    /// The declarations as a whole are inconsistent
    #[error("configuration validation failed: {message}")]
    ValidationFailed { message: String },

    /// The library refused a declaration that passed validation
    #[error("failed to build '{name}': {source}")]
    Build {
        name: String,
        #[source]
        source: ErrorCode,
    },
}

impl ConfigError {
    pub(crate) fn invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.into(),
            reason: reason.into(),
        }
    }
}
