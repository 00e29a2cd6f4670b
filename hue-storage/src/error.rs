//! Error types for the storage layer.

use thiserror::Error;

/// Errors produced while loading, reading or writing the key-value document.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse storage document: {0}")]
    Parse(String),

    #[error("Failed to serialize value for key '{key}': {message}")]
    Serialize { key: String, message: String },

    #[error("Failed to decode value for key '{key}': {message}")]
    Decode { key: String, message: String },

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Convenience Result type alias for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;
