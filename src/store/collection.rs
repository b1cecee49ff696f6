//! Collection files
//!
//! Each collection is one newline-delimited JSON file under
//! `<data_dir>/collections/`. Three access patterns:
//!
//! - `read_all` returns every payload in write order, verifying record
//!   checksums and failing loudly on the first corrupt line
//! - `append_all` appends records without touching existing ones
//! - `replace_all` rewrites the whole collection atomically via a temp file
//!   and rename
//!
//! Collection names are restricted to `[A-Za-z0-9_]` so they are always safe
//! as file names.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use serde_json::Value;

use super::errors::{StoreError, StoreResult};
use super::record::DocumentRecord;

const COLLECTIONS_DIR: &str = "collections";
const FILE_EXTENSION: &str = "jsonl";

/// Handle to the collection files under one data directory.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    root: PathBuf,
}

impl DocumentStore {
    /// Open a store rooted at `data_dir`, creating the collections
    /// directory if needed.
    pub fn open(data_dir: &Path) -> StoreResult<Self> {
        let root = data_dir.join(COLLECTIONS_DIR);
        fs::create_dir_all(&root).map_err(|e| {
            StoreError::Io(format!(
                "failed to create collections directory {}: {}",
                root.display(),
                e
            ))
        })?;
        Ok(Self { root })
    }

    /// Whether a collection file exists on disk.
    pub fn exists(&self, name: &str) -> StoreResult<bool> {
        Ok(self.collection_path(name)?.exists())
    }

    /// Read every payload in a collection, in write order.
    ///
    /// A missing collection file reads as empty. Every record's checksum is
    /// verified; corruption fails the whole read.
    pub fn read_all(&self, name: &str) -> StoreResult<Vec<Value>> {
        let path = self.collection_path(name)?;
        if !path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&path)
            .map_err(|e| StoreError::Io(format!("failed to open {}: {}", path.display(), e)))?;
        let reader = BufReader::new(file);

        let mut payloads = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line
                .map_err(|e| StoreError::Io(format!("failed to read {}: {}", path.display(), e)))?;
            if line.trim().is_empty() {
                continue;
            }

            let record: DocumentRecord =
                serde_json::from_str(&line).map_err(|e| StoreError::MalformedRecord {
                    collection: name.to_string(),
                    line: index + 1,
                    reason: e.to_string(),
                })?;

            if !record.verify()? {
                return Err(StoreError::ChecksumMismatch {
                    collection: name.to_string(),
                    line: index + 1,
                });
            }

            payloads.push(record.into_payload());
        }

        Ok(payloads)
    }

    /// Append payloads to a collection, creating it if absent.
    pub fn append_all(&self, name: &str, payloads: &[Value]) -> StoreResult<()> {
        let path = self.collection_path(name)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| StoreError::Io(format!("failed to open {}: {}", path.display(), e)))?;

        for payload in payloads {
            write_record(&mut file, payload, &path)?;
        }

        file.sync_all()
            .map_err(|e| StoreError::Io(format!("fsync failed for {}: {}", path.display(), e)))?;
        Ok(())
    }

    /// Replace a collection's entire contents.
    ///
    /// Writes to a temp file in the same directory, fsyncs, then renames
    /// over the old file, so readers see either the old set or the new set.
    pub fn replace_all(&self, name: &str, payloads: &[Value]) -> StoreResult<()> {
        let path = self.collection_path(name)?;
        let tmp_path = path.with_extension("tmp");

        let mut file = File::create(&tmp_path).map_err(|e| {
            StoreError::Io(format!("failed to create {}: {}", tmp_path.display(), e))
        })?;

        for payload in payloads {
            write_record(&mut file, payload, &tmp_path)?;
        }

        file.sync_all().map_err(|e| {
            StoreError::Io(format!("fsync failed for {}: {}", tmp_path.display(), e))
        })?;
        drop(file);

        fs::rename(&tmp_path, &path).map_err(|e| {
            StoreError::Io(format!(
                "failed to rename {} to {}: {}",
                tmp_path.display(),
                path.display(),
                e
            ))
        })?;
        Ok(())
    }

    fn collection_path(&self, name: &str) -> StoreResult<PathBuf> {
        validate_collection_name(name)?;
        Ok(self.root.join(format!("{}.{}", name, FILE_EXTENSION)))
    }
}

fn write_record(file: &mut File, payload: &Value, path: &Path) -> StoreResult<()> {
    let record = DocumentRecord::new(payload.clone())?;
    let line =
        serde_json::to_string(&record).map_err(|e| StoreError::Serialization(e.to_string()))?;
    file.write_all(line.as_bytes())
        .and_then(|_| file.write_all(b"\n"))
        .map_err(|e| StoreError::Io(format!("failed to write {}: {}", path.display(), e)))
}

/// Collection names may only contain ASCII alphanumerics and underscores.
pub fn validate_collection_name(name: &str) -> StoreResult<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidCollectionName(name.to_string()))
    }
}
