//! Configuration error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to merge configuration: {0}")]
    MergeError(#[from] config::ConfigError),

    #[error("Invalid schema '{schema}': {reason}")]
    SchemaError { schema: String, reason: String },

    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    #[error("Failed to render configuration as TOML: {0}")]
    RenderError(#[from] toml::ser::Error),

    #[error("XDG directory error: {0}")]
    XdgError(String),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
