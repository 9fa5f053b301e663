//! Registry error types
//!
//! Each pipeline stage has its own error so callers can tell a skippable
//! failure (probe, extraction) from a fatal one (store).

use std::path::PathBuf;
use thiserror::Error;

/// A root or directory entry could not be read during probing.
///
/// Never aborts a scan: the scanner logs it and moves on.
#[derive(Error, Debug)]
#[error("Failed to read {path}")]
pub struct ProbeError {
    pub path: PathBuf,
    /// Entry name under the root; `None` when the root itself failed
    pub name: Option<String>,
    #[source]
    pub source: std::io::Error,
}

/// A qualifying tool directory whose files could not be read.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// Permission denied, vanished file, or any other read failure
    #[error("Failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid UTF-8
    #[error("File is not valid UTF-8: {path}")]
    Encoding { path: PathBuf },
}

impl ExtractionError {
    pub fn path(&self) -> &PathBuf {
        match self {
            ExtractionError::Io { path, .. } | ExtractionError::Encoding { path } => path,
        }
    }
}

/// Persistence failures. Catalog integrity cannot be guaranteed after one of
/// these, so they always propagate to the caller.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to read catalog store at {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write catalog store at {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Catalog store at {path} is corrupted or has an invalid format")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize catalog store")]
    Serialize {
        #[source]
        source: serde_json::Error,
    },
}

/// Configuration file failures
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },

    #[error("Failed to serialize config")]
    Serialize {
        #[source]
        source: serde_yaml_ng::Error,
    },

    #[error("Failed to write config file: {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not determine a config directory for this platform")]
    NoConfigDir,
}

/// Top-level error for registry operations
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Lookup with no match. Query methods return `Option`/empty results;
    /// this variant is for callers that must act on a specific tool.
    #[error("Tool not found: {name}\n\nRun 'toolregistry scan' to discover tools.")]
    NotFound { name: String },
}

pub type Result<T, E = RegistryError> = std::result::Result<T, E>;
