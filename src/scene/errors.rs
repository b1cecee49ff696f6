//! # Scene Errors

use thiserror::Error;

use crate::store::StoreError;

/// Result type for scene operations
pub type SceneResult<T> = Result<T, SceneError>;

/// Scene registry and version store errors
#[derive(Debug, Clone, Error)]
pub enum SceneError {
    #[error("Scene not found: {0}")]
    SceneNotFound(String),

    #[error("Version {version} not found for scene {scene}")]
    VersionNotFound { scene: String, version: u32 },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SceneError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            SceneError::SceneNotFound(_) => 404,
            SceneError::VersionNotFound { .. } => 404,
            SceneError::Store(e) => e.status_code(),
        }
    }
}
