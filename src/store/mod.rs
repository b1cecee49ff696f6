//! Document store for scenebase
//!
//! Holds the canonical persistent state of all scene documents as
//! per-collection newline-delimited JSON files.
//!
//! # Design Principles
//!
//! - One file per collection, one checksummed record per line
//! - Checksum-verified on every read, fail loudly on corruption
//! - Whole-collection replacement is atomic (temp file + rename)
//! - History collections are append-only; the store itself does not
//!   distinguish them, callers choose `append_all` vs `replace_all`
//! - Per-document durability only; no cross-collection transactions

mod collection;
mod errors;
mod record;

pub use collection::{validate_collection_name, DocumentStore};
pub use errors::{StoreError, StoreResult};
pub use record::{compute_payload_checksum, format_checksum, DocumentRecord};
