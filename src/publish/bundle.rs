//! Bundle assembly
//!
//! Turns a resolved document set into a frozen, relocatable static bundle.
//! Assembly follows this exact sequence:
//!
//! 1. Create a fresh timestamp-named directory under the bundle root
//! 2. Copy the static site shell (entry page, built bundle, icon, locales)
//! 3. Rewrite origin and scene-id placeholders inside the copied entry page
//! 4. Freeze the document set to `Scene/<scene_id>.json`
//! 5. Classify every node, extract references, accumulate one global set
//! 6. Copy the directory containing each referenced asset, preserving its
//!    relative path; individual copy failures become warnings, not errors
//! 7. Write `manifest.json` last - its presence marks the bundle complete
//!
//! A failure in steps 2-4 or 7 aborts the assembly and removes the partial
//! directory. Each builder owns exactly one output directory, so concurrent
//! exports never interfere.

use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::observability::Logger;
use crate::scene::now_rfc3339;

use super::errors::{PublishError, PublishResult};
use super::node::classify;
use super::refs::extract_references;
use super::PublishConfig;

/// Entry page of the static shell, rewritten during assembly.
pub const SHELL_ENTRY: &str = "index.html";
/// Built JS/CSS bundle directory, required.
const SHELL_BUILD_DIR: &str = "build";
/// Shell files copied when present.
const SHELL_OPTIONAL_FILES: [&str; 1] = ["favicon.ico"];
/// Shell directories copied when present.
const SHELL_OPTIONAL_DIRS: [&str; 1] = ["locales"];

/// Origin placeholder in the entry page; rewritten so the bundle resolves
/// everything relative to wherever it is hosted.
const ORIGIN_PLACEHOLDER: &str = "location.origin";
const ORIGIN_REPLACEMENT: &str = "'.'";
/// Scene-id placeholder in the entry page.
const SCENE_ID_PLACEHOLDER: &str = "__SCENE_ID__";

/// Directory holding the frozen snapshot inside the bundle.
const SNAPSHOT_DIR: &str = "Scene";
/// Completion marker, written last.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Names tried before giving up on a colliding bundle id.
const BUNDLE_NAME_ATTEMPTS: u32 = 100;

/// A completed bundle.
#[derive(Debug, Clone)]
pub struct Bundle {
    /// Timestamp-derived directory name
    pub id: String,
    /// Absolute path of the bundle directory
    pub dir: PathBuf,
    /// Relative URL of the entry page, scene id appended
    pub url: String,
    /// Non-fatal asset-copy failures
    pub warnings: Vec<String>,
}

/// Completion marker and metadata, written at the bundle root after every
/// other step has succeeded. A bundle directory without one is an
/// incomplete export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleManifest {
    /// Scene this bundle was exported from
    pub scene_id: String,
    /// Requested version; absent means the live set was exported
    pub version: Option<u32>,
    /// Assembly timestamp (RFC3339)
    pub created_at: String,
    /// Number of nodes in the frozen snapshot
    pub node_count: usize,
    /// Number of distinct asset references discovered
    pub asset_count: usize,
    /// Non-fatal asset-copy failures
    pub warnings: Vec<String>,
    /// Manifest format version
    pub format_version: u8,
}

impl BundleManifest {
    /// Serialize and write the manifest, fsynced so the completion marker
    /// is durable before the assembly reports success.
    pub fn write_to_file(&self, path: &Path) -> PublishResult<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| PublishError::Serialization(e.to_string()))?;

        let mut file = File::create(path).map_err(|e| {
            PublishError::Io(format!("failed to create {}: {}", path.display(), e))
        })?;
        file.write_all(json.as_bytes()).map_err(|e| {
            PublishError::Io(format!("failed to write {}: {}", path.display(), e))
        })?;
        file.sync_all().map_err(|e| {
            PublishError::Io(format!("fsync failed for {}: {}", path.display(), e))
        })
    }

    /// Read a manifest back from a bundle directory.
    pub fn read_from_file(path: &Path) -> PublishResult<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            PublishError::Io(format!("failed to read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&contents).map_err(|e| PublishError::Serialization(e.to_string()))
    }
}

/// Whether a bundle directory holds a completed export.
pub fn is_complete(bundle_dir: &Path) -> bool {
    bundle_dir.join(MANIFEST_FILE).is_file()
}

/// Builder for one export. Owns its output directory from creation to
/// completion; dropped state is never shared between exports.
pub struct BundleBuilder<'a> {
    config: &'a PublishConfig,
    scene_id: &'a str,
    version: Option<u32>,
    warnings: Vec<String>,
}

impl<'a> BundleBuilder<'a> {
    pub fn new(config: &'a PublishConfig, scene_id: &'a str, version: Option<u32>) -> Self {
        Self {
            config,
            scene_id,
            version,
            warnings: Vec::new(),
        }
    }

    /// Assemble the bundle. The partial directory is removed on any fatal
    /// failure, so the bundle root only ever accumulates directories that
    /// at least reached the asset-copy stage.
    pub fn assemble(mut self, documents: &[Value]) -> PublishResult<Bundle> {
        let (id, dir) = self.create_bundle_dir()?;

        if let Err(e) = self.build_contents(&dir, documents) {
            // Best effort removal, already on the error path
            let _ = fs::remove_dir_all(&dir);
            return Err(e);
        }

        let url = format!(
            "{}/{}/{}?sceneID={}",
            self.config.url_prefix.trim_end_matches('/'),
            id,
            SHELL_ENTRY,
            self.scene_id
        );

        Ok(Bundle {
            id,
            dir,
            url,
            warnings: self.warnings,
        })
    }

    fn build_contents(&mut self, dir: &Path, documents: &[Value]) -> PublishResult<()> {
        self.copy_shell(dir)?;
        self.rewrite_entry(dir)?;
        self.write_snapshot(dir, documents)?;

        let references = collect_references(documents);
        self.copy_assets(dir, &references);

        let manifest = BundleManifest {
            scene_id: self.scene_id.to_string(),
            version: self.version,
            created_at: now_rfc3339(),
            node_count: documents.len(),
            asset_count: references.len(),
            warnings: self.warnings.clone(),
            format_version: 1,
        };
        manifest.write_to_file(&dir.join(MANIFEST_FILE))
    }

    /// Create a fresh directory named by the current UTC timestamp,
    /// suffixed on collision so concurrent exports in the same second get
    /// distinct directories.
    fn create_bundle_dir(&self) -> PublishResult<(String, PathBuf)> {
        fs::create_dir_all(&self.config.bundle_root).map_err(|e| {
            PublishError::Io(format!(
                "failed to create bundle root {}: {}",
                self.config.bundle_root.display(),
                e
            ))
        })?;

        let base = Utc::now().format("%Y%m%d%H%M%S").to_string();
        for attempt in 0..BUNDLE_NAME_ATTEMPTS {
            let id = if attempt == 0 {
                base.clone()
            } else {
                format!("{}-{}", base, attempt)
            };
            let dir = self.config.bundle_root.join(&id);

            match fs::create_dir(&dir) {
                Ok(()) => return Ok((id, dir)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(PublishError::Io(format!(
                        "failed to create bundle directory {}: {}",
                        dir.display(),
                        e
                    )))
                }
            }
        }

        Err(PublishError::Io(format!(
            "exhausted bundle directory names for {}",
            base
        )))
    }

    fn copy_shell(&self, dir: &Path) -> PublishResult<()> {
        let shell = &self.config.shell_dir;

        copy_file(&shell.join(SHELL_ENTRY), &dir.join(SHELL_ENTRY))?;
        copy_dir_recursive(&shell.join(SHELL_BUILD_DIR), &dir.join(SHELL_BUILD_DIR))?;

        for name in SHELL_OPTIONAL_FILES {
            let src = shell.join(name);
            if src.is_file() {
                copy_file(&src, &dir.join(name))?;
            }
        }
        for name in SHELL_OPTIONAL_DIRS {
            let src = shell.join(name);
            if src.is_dir() {
                copy_dir_recursive(&src, &dir.join(name))?;
            }
        }
        Ok(())
    }

    /// Rewrite the copied entry page so it loads from wherever it is
    /// hosted: the origin placeholder becomes a relative self-reference and
    /// the scene-id placeholder becomes the concrete id.
    fn rewrite_entry(&self, dir: &Path) -> PublishResult<()> {
        let path = dir.join(SHELL_ENTRY);
        let contents = fs::read_to_string(&path).map_err(|e| {
            PublishError::Io(format!("failed to read {}: {}", path.display(), e))
        })?;

        let rewritten = contents
            .replace(ORIGIN_PLACEHOLDER, ORIGIN_REPLACEMENT)
            .replace(SCENE_ID_PLACEHOLDER, self.scene_id);

        fs::write(&path, rewritten)
            .map_err(|e| PublishError::Io(format!("failed to write {}: {}", path.display(), e)))
    }

    /// Freeze the exact document set to `Scene/<scene_id>.json`. Compact
    /// encoding keeps repeated exports of the same version byte-identical.
    fn write_snapshot(&self, dir: &Path, documents: &[Value]) -> PublishResult<()> {
        let snapshot_dir = dir.join(SNAPSHOT_DIR);
        fs::create_dir_all(&snapshot_dir).map_err(|e| {
            PublishError::Io(format!(
                "failed to create {}: {}",
                snapshot_dir.display(),
                e
            ))
        })?;

        let bytes = serde_json::to_vec(documents)
            .map_err(|e| PublishError::Serialization(e.to_string()))?;

        let path = snapshot_dir.join(format!("{}.json", self.scene_id));
        fs::write(&path, bytes)
            .map_err(|e| PublishError::Io(format!("failed to write {}: {}", path.display(), e)))
    }

    /// Copy the directory containing each referenced asset into the bundle.
    ///
    /// Directory-level copies tolerate sibling files the page may load
    /// lazily (mip variants, .mtl next to .obj). A failed copy is recorded
    /// as a warning; the bundle ships with a dangling reference rather than
    /// failing a whole export over one bad path.
    fn copy_assets(&mut self, dir: &Path, references: &BTreeSet<String>) {
        let mut copied_dirs: BTreeSet<PathBuf> = BTreeSet::new();

        for reference in references {
            let rel = Path::new(reference.trim_start_matches('/'));
            let parent = rel
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf);

            let result = match parent {
                Some(parent) => {
                    if !copied_dirs.insert(parent.clone()) {
                        continue;
                    }
                    copy_dir_recursive(
                        &self.config.asset_root.join(&parent),
                        &dir.join(&parent),
                    )
                }
                // A reference directly under the root copies just the file
                None => copy_file(&self.config.asset_root.join(rel), &dir.join(rel)),
            };

            if let Err(e) = result {
                let reason = e.to_string();
                Logger::warn(
                    "ASSET_COPY_FAILED",
                    &[("path", reference.as_str()), ("reason", reason.as_str())],
                );
                self.warnings
                    .push(format!("failed to copy assets for {}: {}", reference, reason));
            }
        }
    }
}

/// Classify every node and union the per-node reference sets.
pub fn collect_references(documents: &[Value]) -> BTreeSet<String> {
    let mut references = BTreeSet::new();
    for node in documents {
        references.extend(extract_references(node, classify(node)));
    }
    references
}

fn copy_file(src: &Path, dst: &Path) -> PublishResult<()> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            PublishError::Io(format!("failed to create {}: {}", parent.display(), e))
        })?;
    }
    fs::copy(src, dst).map_err(|e| {
        PublishError::Io(format!(
            "failed to copy {} to {}: {}",
            src.display(),
            dst.display(),
            e
        ))
    })?;
    Ok(())
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> PublishResult<()> {
    if !src.is_dir() {
        return Err(PublishError::Io(format!(
            "directory not found: {}",
            src.display()
        )));
    }

    fs::create_dir_all(dst)
        .map_err(|e| PublishError::Io(format!("failed to create {}: {}", dst.display(), e)))?;

    let entries = fs::read_dir(src)
        .map_err(|e| PublishError::Io(format!("failed to read {}: {}", src.display(), e)))?;

    for entry in entries {
        let entry = entry.map_err(|e| {
            PublishError::Io(format!("failed to read entry in {}: {}", src.display(), e))
        })?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            copy_dir_recursive(&src_path, &dst_path)?;
        } else if src_path.is_file() {
            copy_file(&src_path, &dst_path)?;
        }
        // Symlinks and other file types are skipped
    }

    Ok(())
}
