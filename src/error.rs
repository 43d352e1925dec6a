//! Error types for manifest building and document scanning.

use std::path::PathBuf;
use thiserror::Error;

/// Filesystem-level failures raised while reading the source directory or
/// writing the manifest.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error at {path}: {source}")]
    PathIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl StorageError {
    pub fn at(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::PathIo {
            path: path.into(),
            source,
        }
    }
}

/// Errors surfaced by the library API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    StorageError(#[from] StorageError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The candidate set could not be determined. This is the only failure a
    /// scan surfaces to consumers.
    #[error("Manifest unavailable: {0}")]
    ManifestError(String),

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("Watch error: {0}")]
    WatchError(String),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::HttpError(err.to_string())
    }
}
