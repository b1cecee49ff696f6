//! Server configuration
//!
//! One JSON file, every field defaulted, loaded once at boot and passed
//! down explicitly. Subsystems never read configuration from ambient
//! state.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::publish::PublishConfig;

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("Failed to parse config file {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error("Failed to write config file {path}: {reason}")]
    Write { path: String, reason: String },
}

/// Top-level configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (default 0.0.0.0)
    #[serde(default = "default_host")]
    pub host: String,

    /// Listen port (default 8080)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Data directory holding the document collections
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Root of the asset storage tree (`/Upload/...` references resolve
    /// against this)
    #[serde(default = "default_asset_root")]
    pub asset_root: PathBuf,

    /// Source directory of the static site shell
    #[serde(default = "default_shell_dir")]
    pub shell_dir: PathBuf,

    /// Directory that receives publication bundles
    #[serde(default = "default_bundle_dir")]
    pub bundle_dir: PathBuf,

    /// URL prefix under which bundles are served
    #[serde(default = "default_bundle_url_prefix")]
    pub bundle_url_prefix: String,

    /// Allowed CORS origins; empty means permissive (development)
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}
fn default_asset_root() -> PathBuf {
    PathBuf::from("./public")
}
fn default_shell_dir() -> PathBuf {
    PathBuf::from("./public")
}
fn default_bundle_dir() -> PathBuf {
    PathBuf::from("./bundles")
}
fn default_bundle_url_prefix() -> String {
    "/bundles".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        // serde defaults are the single source of truth
        serde_json::from_str("{}").expect("empty config must deserialize")
    }
}

impl ServerConfig {
    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Write this configuration to a JSON file (pretty-printed).
    pub fn write(&self, path: &Path) -> ConfigResult<()> {
        let json = serde_json::to_string_pretty(self).expect("config serializes");
        fs::write(path, json).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Socket address string for the listener.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Publication roots derived from this configuration.
    pub fn publish_config(&self) -> PublishConfig {
        PublishConfig {
            asset_root: self.asset_root.clone(),
            shell_dir: self.shell_dir.clone(),
            bundle_root: self.bundle_dir.clone(),
            url_prefix: self.bundle_url_prefix.clone(),
        }
    }
}
