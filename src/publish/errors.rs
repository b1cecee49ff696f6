//! # Publication Errors
//!
//! Fatal failures only. A failed copy of an individual asset is NOT an
//! error: it is recorded in the publication's warnings list and the bundle
//! is still produced.

use thiserror::Error;

use crate::scene::SceneError;

/// Result type for publication operations
pub type PublishResult<T> = Result<T, PublishError>;

/// Publication pipeline errors
#[derive(Debug, Clone, Error)]
pub enum PublishError {
    #[error("Scene not found: {0}")]
    SceneNotFound(String),

    #[error("Version {version} not found for scene {scene}")]
    VersionNotFound { scene: String, version: u32 },

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Snapshot serialization failed: {0}")]
    Serialization(String),

    #[error("Store error: {0}")]
    Store(String),
}

impl PublishError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            PublishError::SceneNotFound(_) => 404,
            PublishError::VersionNotFound { .. } => 404,
            PublishError::Io(_) => 500,
            PublishError::Serialization(_) => 500,
            PublishError::Store(_) => 500,
        }
    }
}

impl From<SceneError> for PublishError {
    fn from(err: SceneError) -> Self {
        match err {
            SceneError::SceneNotFound(id) => PublishError::SceneNotFound(id),
            SceneError::VersionNotFound { scene, version } => {
                PublishError::VersionNotFound { scene, version }
            }
            SceneError::Store(e) => PublishError::Store(e.to_string()),
        }
    }
}
