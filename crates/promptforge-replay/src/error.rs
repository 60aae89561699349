//! Error types for promptforge-replay

use thiserror::Error;

/// Audit error type
#[derive(Debug, Error)]
pub enum Error {
    /// Audit record not found
    #[error("audit record not found: {0}")]
    NotFound(String),

    /// Refused to overwrite an existing record
    #[error("audit record already exists: {0}")]
    AlreadyExists(String),

    /// Filesystem error
    #[error("io error: {0}")]
    Io(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
