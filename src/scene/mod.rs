//! Scene registry and versioned document sets
//!
//! A scene is a metadata row plus two collections: the live document set
//! (mutable, replaced on every save) and an append-only history collection
//! of `_version`-tagged sets. Point-in-time reads go through
//! [`SceneStore::load_documents`].

mod errors;
mod meta;
mod store;

pub use errors::{SceneError, SceneResult};
pub use meta::{now_rfc3339, SceneMeta};
pub use store::{SceneStore, VERSION_FIELD};
