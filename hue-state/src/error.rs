//! Error types for hue-state

use thiserror::Error;

/// Result type for hue-state operations
pub type Result<T> = std::result::Result<T, StateError>;

/// Errors that can occur while reading or mutating bridge state
#[derive(Debug, Error)]
pub enum StateError {
    #[error("Light not found: {0}")]
    LightNotFound(String),

    #[error("Group not found: {0}")]
    GroupNotFound(String),

    #[error("Scene not found: {0}")]
    SceneNotFound(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error(transparent)]
    Storage(#[from] hue_storage::StorageError),
}

impl StateError {
    /// Whether this error means the addressed record does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StateError::LightNotFound(_) | StateError::GroupNotFound(_) | StateError::SceneNotFound(_)
        )
    }
}
