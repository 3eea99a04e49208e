//! Error types for the std-backed collaborators

use std::path::PathBuf;

use thiserror::Error;

/// Failures of the local filesystem and configuration backends
#[derive(Debug, Error)]
pub enum BackendError {
    /// Filesystem access failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("invalid configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration could not be serialised
    #[error("could not serialise configuration: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    /// Host directory does not exist
    #[error("host directory {} not found", .0.display())]
    HostNotFound(PathBuf),

    /// Path escapes the host root
    #[error("invalid path: {0}")]
    InvalidPath(String),
}

/// Result type for backend operations
pub type Result<T> = std::result::Result<T, BackendError>;

impl From<BackendError> for iecfuji_core::Error {
    fn from(e: BackendError) -> Self {
        iecfuji_core::Error::Io(e.to_string())
    }
}
