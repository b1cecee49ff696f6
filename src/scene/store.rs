//! Scene registry and version store
//!
//! Owns the mapping from a logical scene to its live collection and its
//! history collection.
//!
//! # Versioning Model
//!
//! - Each scene owns a live collection (its current document set) and an
//!   append-only `<collection>_history` collection
//! - A structural save bumps the version to N+1, replaces the live
//!   collection with the new set, and appends the same set tagged
//!   `_version = N+1` to history
//! - History rows are immutable once written; concurrent edits to the live
//!   scene never touch them, which isolates point-in-time export from
//!   in-progress editing
//! - Loading a historical set strips the `_version` tag, so a historical
//!   load and a live load of the same version serialize identically

use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;

use serde_json::Value;

use crate::observability::Logger;
use crate::store::DocumentStore;

use super::errors::{SceneError, SceneResult};
use super::meta::{now_rfc3339, SceneMeta};

/// Reserved collection holding scene metadata rows.
const SCENES_COLLECTION: &str = "scenes";

/// Field injected into history rows to tag their version.
pub const VERSION_FIELD: &str = "_version";

/// Scene registry backed by the document store.
///
/// Metadata is hydrated into memory at open and kept in sync on every
/// write; document sets are always read from disk.
pub struct SceneStore {
    docs: DocumentStore,
    scenes: RwLock<HashMap<String, SceneMeta>>,
}

impl SceneStore {
    /// Open the registry, hydrating scene metadata from the store.
    pub fn open(data_dir: &Path) -> SceneResult<Self> {
        let docs = DocumentStore::open(data_dir)?;

        let mut scenes = HashMap::new();
        for payload in docs.read_all(SCENES_COLLECTION)? {
            let meta: SceneMeta = serde_json::from_value(payload).map_err(|e| {
                crate::store::StoreError::Serialization(format!(
                    "invalid scene metadata row: {}",
                    e
                ))
            })?;
            scenes.insert(meta.id.clone(), meta);
        }

        Ok(Self {
            docs,
            scenes: RwLock::new(scenes),
        })
    }

    /// Create a new scene with an empty document set, at version 0.
    pub fn create(&self, name: &str, owner: Option<String>) -> SceneResult<SceneMeta> {
        let meta = SceneMeta::new(name, owner);

        let mut scenes = self.scenes.write().expect("scene registry lock poisoned");
        scenes.insert(meta.id.clone(), meta.clone());
        self.persist_registry(&scenes)?;

        Ok(meta)
    }

    /// List all scenes, ordered by creation time then id.
    pub fn list(&self) -> Vec<SceneMeta> {
        let scenes = self.scenes.read().expect("scene registry lock poisoned");
        let mut all: Vec<SceneMeta> = scenes.values().cloned().collect();
        all.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        all
    }

    /// Resolve a scene id to its metadata.
    pub fn get(&self, scene_id: &str) -> SceneResult<SceneMeta> {
        let scenes = self.scenes.read().expect("scene registry lock poisoned");
        scenes
            .get(scene_id)
            .cloned()
            .ok_or_else(|| SceneError::SceneNotFound(scene_id.to_string()))
    }

    /// Structural save: replace the live set and archive it to history.
    ///
    /// Returns the updated metadata with the new version number.
    pub fn save(&self, scene_id: &str, documents: &[Value]) -> SceneResult<SceneMeta> {
        let mut scenes = self.scenes.write().expect("scene registry lock poisoned");
        let meta = scenes
            .get_mut(scene_id)
            .ok_or_else(|| SceneError::SceneNotFound(scene_id.to_string()))?;

        let new_version = meta.version + 1;

        // Live set first, then the immutable archive copy
        self.docs.replace_all(&meta.collection_name, documents)?;

        let tagged: Vec<Value> = documents
            .iter()
            .map(|doc| tag_version(doc, new_version))
            .collect();
        self.docs
            .append_all(&meta.history_collection_name(), &tagged)?;

        meta.version = new_version;
        meta.updated_at = now_rfc3339();
        let saved = meta.clone();
        self.persist_registry(&scenes)?;

        Logger::info(
            "SCENE_SAVED",
            &[
                ("scene_id", scene_id),
                ("version", &new_version.to_string()),
                ("nodes", &documents.len().to_string()),
            ],
        );

        Ok(saved)
    }

    /// Load the document set for a scene at a given version.
    ///
    /// `None` reads the live collection; `Some(n)` reads history rows tagged
    /// with version `n`, stripping the tag from each returned node.
    pub fn load_documents(
        &self,
        scene_id: &str,
        version: Option<u32>,
    ) -> SceneResult<Vec<Value>> {
        let meta = self.get(scene_id)?;

        match version {
            None => Ok(self.docs.read_all(&meta.collection_name)?),
            Some(n) => {
                let rows = self.docs.read_all(&meta.history_collection_name())?;
                let matched: Vec<Value> = rows
                    .into_iter()
                    .filter(|row| row_version(row) == Some(n))
                    .map(strip_version)
                    .collect();

                if matched.is_empty() {
                    return Err(SceneError::VersionNotFound {
                        scene: scene_id.to_string(),
                        version: n,
                    });
                }
                Ok(matched)
            }
        }
    }

    /// Distinct saved version numbers for a scene, ascending.
    pub fn versions(&self, scene_id: &str) -> SceneResult<Vec<u32>> {
        let meta = self.get(scene_id)?;
        let rows = self.docs.read_all(&meta.history_collection_name())?;

        let mut versions: Vec<u32> = rows.iter().filter_map(row_version).collect();
        versions.sort_unstable();
        versions.dedup();
        Ok(versions)
    }

    /// Persist the metadata registry. Caller must hold the write lock.
    fn persist_registry(&self, scenes: &HashMap<String, SceneMeta>) -> SceneResult<()> {
        let mut metas: Vec<&SceneMeta> = scenes.values().collect();
        metas.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });

        let payloads: Vec<Value> = metas
            .iter()
            .map(|meta| {
                serde_json::to_value(meta)
                    .map_err(|e| crate::store::StoreError::Serialization(e.to_string()))
            })
            .collect::<Result<_, _>>()?;

        self.docs.replace_all(SCENES_COLLECTION, &payloads)?;
        Ok(())
    }
}

fn tag_version(doc: &Value, version: u32) -> Value {
    let mut tagged = doc.clone();
    if let Value::Object(map) = &mut tagged {
        map.insert(VERSION_FIELD.to_string(), Value::from(version));
    }
    tagged
}

fn row_version(row: &Value) -> Option<u32> {
    row.get(VERSION_FIELD)?.as_u64().map(|v| v as u32)
}

fn strip_version(mut row: Value) -> Value {
    if let Value::Object(map) = &mut row {
        map.remove(VERSION_FIELD);
    }
    row
}
