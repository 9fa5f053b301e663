//! Registry configuration (config.yaml)
//!
//! Lives in the platform config directory unless overridden. A missing file
//! means defaults; every field is optional in the YAML.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::ConfigError;

/// Config file name inside the config directory
pub const CONFIG_FILE: &str = "config.yaml";

/// Catalog file name inside the data directory
pub const CATALOG_FILE: &str = "registry.json";

/// Directory names never treated as tools, on top of hidden and `_` names
pub const DEFAULT_EXCLUDES: &[&str] = &[
    "branding",
    "backups",
    "tests",
    "examples",
    "__pycache__",
    "node_modules",
    "venv",
];

/// Read cap per file (4 MiB)
pub const DEFAULT_MAX_READ_BYTES: u64 = 4 * 1024 * 1024;

pub const DEFAULT_CONCURRENCY: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Roots scanned when `scan` is run without explicit paths
    pub scan_paths: Vec<PathBuf>,

    /// Catalog store location; defaults to the platform data directory
    pub catalog_path: Option<PathBuf>,

    /// Extra directory names to skip while probing
    pub exclude: Vec<String>,

    /// Extraction workers per batch
    pub concurrency: usize,

    /// Per-file read cap in bytes
    pub max_read_bytes: u64,

    /// Drop catalog entries whose directory no longer qualifies
    pub prune_stale: bool,

    /// Record launches in the usage log
    pub track_usage: bool,

    /// Interpreter used by `launch`
    pub interpreter: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            scan_paths: Vec::new(),
            catalog_path: None,
            exclude: DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect(),
            concurrency: DEFAULT_CONCURRENCY,
            max_read_bytes: DEFAULT_MAX_READ_BYTES,
            prune_stale: true,
            track_usage: true,
            interpreter: "python3".to_string(),
        }
    }
}

impl RegistryConfig {
    /// Load from the default location, or defaults if there is no file
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path(&Self::default_path()?)
    }

    /// Load from a specific path, or defaults if the file does not exist
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_yaml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml_ng::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml_ng::from_str(content)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }

        let content =
            serde_yaml_ng::to_string(self).map_err(|source| ConfigError::Serialize { source })?;
        std::fs::write(path, content).map_err(write_err)
    }

    /// `<config dir>/config.yaml`
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        Ok(project_dirs()?.config_dir().join(CONFIG_FILE))
    }

    /// Configured catalog path, else `<data dir>/registry.json`
    pub fn resolved_catalog_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.catalog_path {
            Some(path) => Ok(path.clone()),
            None => Ok(project_dirs()?.data_dir().join(CATALOG_FILE)),
        }
    }

    /// At least one worker, whatever the file says
    pub fn workers(&self) -> usize {
        self.concurrency.max(1)
    }
}

fn project_dirs() -> Result<directories::ProjectDirs, ConfigError> {
    directories::ProjectDirs::from("", "", "toolregistry").ok_or(ConfigError::NoConfigDir)
}
