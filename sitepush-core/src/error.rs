//! Error types for sitepush-core.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from configuration loading and request validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure (permission denied, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error (write path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load, with the offending file.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("config not found at {path}")]
    NotFound { path: PathBuf },

    #[error("config already exists at {path}")]
    AlreadyExists { path: PathBuf },

    /// A field holds a value the deployment cannot use.
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("invalid repository '{0}'; expected owner/name")]
    InvalidRepository(String),
}
