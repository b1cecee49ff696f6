//! Publication entry point
//!
//! Ties the version store and the bundle assembler together for one
//! scene+version request. Publication never writes to the document store;
//! its only side effects are the bundle directory's files.

use std::sync::Arc;

use crate::observability::Logger;
use crate::scene::SceneStore;

use super::bundle::BundleBuilder;
use super::errors::PublishResult;
use super::PublishConfig;

/// Result of one publication request.
#[derive(Debug, Clone)]
pub struct Publication {
    /// Directory name of the produced bundle
    pub bundle_id: String,
    /// Relative URL of the bundle's entry page
    pub url: String,
    /// Requested version; absent means the live set was exported
    pub version: Option<u32>,
    /// Non-fatal asset-copy failures
    pub warnings: Vec<String>,
}

/// Publisher bound to one scene store and one publication configuration.
pub struct Publisher {
    store: Arc<SceneStore>,
    config: PublishConfig,
}

impl Publisher {
    pub fn new(store: Arc<SceneStore>, config: PublishConfig) -> Self {
        Self { store, config }
    }

    /// Publish one scene at the requested version.
    ///
    /// Re-invoking is always safe: every invocation assembles an
    /// independent, freshly-named bundle.
    pub fn publish(&self, scene_id: &str, version: Option<u32>) -> PublishResult<Publication> {
        let meta = self.store.get(scene_id)?;
        let version_label = version.map_or_else(|| "latest".to_string(), |v| v.to_string());
        Logger::info(
            "PUBLISH_START",
            &[
                ("scene_id", scene_id),
                ("collection", &meta.collection_name),
                ("version", &version_label),
            ],
        );

        let documents = self.store.load_documents(scene_id, version)?;
        let bundle = BundleBuilder::new(&self.config, scene_id, version).assemble(&documents)?;

        Logger::info(
            "PUBLISH_COMPLETE",
            &[
                ("scene_id", scene_id),
                ("bundle_id", &bundle.id),
                ("nodes", &documents.len().to_string()),
                ("warnings", &bundle.warnings.len().to_string()),
            ],
        );

        Ok(Publication {
            bundle_id: bundle.id,
            url: bundle.url,
            version,
            warnings: bundle.warnings,
        })
    }
}
