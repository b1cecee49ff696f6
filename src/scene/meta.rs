//! Scene metadata

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metadata row for one scene, stored in the reserved `scenes` collection.
///
/// A scene is never hard-deleted; the registry only ever adds rows or
/// updates them in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneMeta {
    /// Opaque scene identifier
    pub id: String,
    /// Display name shown in the editor
    pub name: String,
    /// Name of the collection holding the live document set
    pub collection_name: String,
    /// Current version number; 0 until the first structural save
    pub version: u32,
    /// Whether the scene is publicly visible
    pub is_public: bool,
    /// Creation timestamp (RFC3339)
    pub created_at: String,
    /// Last-save timestamp (RFC3339)
    pub updated_at: String,
    /// Owning user, if any
    #[serde(default)]
    pub owner: Option<String>,
}

impl SceneMeta {
    /// Create metadata for a brand-new scene with a fresh collection name.
    pub fn new(name: impl Into<String>, owner: Option<String>) -> Self {
        let now = now_rfc3339();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            collection_name: format!("Scene_{}", Uuid::new_v4().simple()),
            version: 0,
            is_public: false,
            created_at: now.clone(),
            updated_at: now,
            owner,
        }
    }

    /// Name of the scene's append-only history collection.
    pub fn history_collection_name(&self) -> String {
        format!("{}_history", self.collection_name)
    }
}

/// Current UTC time in RFC3339 format.
pub fn now_rfc3339() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}
