//! Catalog persistence
//!
//! `CatalogStore` is the seam between the in-memory catalog and wherever
//! records live. `FileStore` keeps everything in one JSON document that is
//! replaced atomically on every mutation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, trace};

use crate::error::StoreError;
use crate::record::ToolRecord;
use crate::usage::UsageEvent;

/// Current on-disk document version
pub const STORE_VERSION: u32 = 1;

pub trait CatalogStore {
    /// Every stored record, in any order
    fn load_all(&self) -> Result<Vec<ToolRecord>, StoreError>;

    /// Insert or replace by name
    fn save(&mut self, record: &ToolRecord) -> Result<(), StoreError>;

    /// Remove by name; absent names are not an error
    fn delete(&mut self, name: &str) -> Result<(), StoreError>;

    fn append_usage(&mut self, event: &UsageEvent) -> Result<(), StoreError>;

    fn load_usage(&self) -> Result<Vec<UsageEvent>, StoreError>;
}

/// Store that lives only as long as the process
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    records: BTreeMap<String, ToolRecord>,
    usage: Vec<UsageEvent>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CatalogStore for MemoryStore {
    fn load_all(&self) -> Result<Vec<ToolRecord>, StoreError> {
        Ok(self.records.values().cloned().collect())
    }

    fn save(&mut self, record: &ToolRecord) -> Result<(), StoreError> {
        self.records.insert(record.name.clone(), record.clone());
        Ok(())
    }

    fn delete(&mut self, name: &str) -> Result<(), StoreError> {
        self.records.remove(name);
        Ok(())
    }

    fn append_usage(&mut self, event: &UsageEvent) -> Result<(), StoreError> {
        self.usage.push(event.clone());
        Ok(())
    }

    fn load_usage(&self) -> Result<Vec<UsageEvent>, StoreError> {
        Ok(self.usage.clone())
    }
}

/// On-disk layout of `registry.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreDocument {
    version: u32,
    #[serde(default)]
    tools: BTreeMap<String, ToolRecord>,
    #[serde(default)]
    usage: Vec<UsageEvent>,
}

impl Default for StoreDocument {
    fn default() -> Self {
        Self {
            version: STORE_VERSION,
            tools: BTreeMap::new(),
            usage: Vec::new(),
        }
    }
}

/// JSON-file store
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    document: StoreDocument,
}

impl FileStore {
    /// Open the store at `path`; a missing file is an empty store
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        let document = if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|source| StoreError::Read {
                path: path.clone(),
                source,
            })?;
            if content.trim().is_empty() {
                StoreDocument::default()
            } else {
                serde_json::from_str(&content).map_err(|source| StoreError::Parse {
                    path: path.clone(),
                    source,
                })?
            }
        } else {
            debug!("No catalog store at {}, starting empty", path.display());
            StoreDocument::default()
        };

        debug!(
            "Opened catalog store {} ({} tools, {} usage events)",
            path.display(),
            document.tools.len(),
            document.usage.len()
        );

        Ok(Self { path, document })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the whole document to a temp file beside the target, then
    /// rename it into place.
    fn flush(&self) -> Result<(), StoreError> {
        let write_err = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };

        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&parent).map_err(write_err)?;

        let content = serde_json::to_string_pretty(&self.document)
            .map_err(|source| StoreError::Serialize { source })?;

        let mut temp = NamedTempFile::new_in(&parent).map_err(write_err)?;
        temp.write_all(content.as_bytes()).map_err(write_err)?;
        temp.as_file().sync_all().map_err(write_err)?;
        temp.persist(&self.path).map_err(|e| write_err(e.error))?;

        trace!("Flushed catalog store to {}", self.path.display());
        Ok(())
    }
}

impl CatalogStore for FileStore {
    fn load_all(&self) -> Result<Vec<ToolRecord>, StoreError> {
        Ok(self.document.tools.values().cloned().collect())
    }

    fn save(&mut self, record: &ToolRecord) -> Result<(), StoreError> {
        let previous = self
            .document
            .tools
            .insert(record.name.clone(), record.clone());
        if let Err(err) = self.flush() {
            match previous {
                Some(previous) => self.document.tools.insert(record.name.clone(), previous),
                None => self.document.tools.remove(&record.name),
            };
            return Err(err);
        }
        Ok(())
    }

    fn delete(&mut self, name: &str) -> Result<(), StoreError> {
        let Some(previous) = self.document.tools.remove(name) else {
            return Ok(());
        };
        if let Err(err) = self.flush() {
            self.document.tools.insert(name.to_string(), previous);
            return Err(err);
        }
        Ok(())
    }

    fn append_usage(&mut self, event: &UsageEvent) -> Result<(), StoreError> {
        self.document.usage.push(event.clone());
        if let Err(err) = self.flush() {
            self.document.usage.pop();
            return Err(err);
        }
        Ok(())
    }

    fn load_usage(&self) -> Result<Vec<UsageEvent>, StoreError> {
        Ok(self.document.usage.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(name: &str) -> ToolRecord {
        ToolRecord::placeholder(name, format!("/tools/{name}"))
    }

    #[test]
    fn test_missing_file_is_empty_store() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::open(temp_dir.path().join("registry.json")).unwrap();
        assert!(store.load_all().unwrap().is_empty());
        assert!(store.load_usage().unwrap().is_empty());
    }

    #[test]
    fn test_file_store_persists_across_opens() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data").join("registry.json");

        let mut store = FileStore::open(&path).unwrap();
        store.save(&record("Alpha")).unwrap();
        store.save(&record("Beta")).unwrap();
        store.delete("Alpha").unwrap();
        store
            .append_usage(&UsageEvent::new("Beta", "launch", true))
            .unwrap();

        let reopened = FileStore::open(&path).unwrap();
        let names: Vec<String> = reopened
            .load_all()
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["Beta"]);
        assert_eq!(reopened.load_usage().unwrap().len(), 1);
    }

    #[test]
    fn test_corrupt_file_is_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("registry.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = FileStore::open(&path).unwrap_err();
        assert!(matches!(err, StoreError::Parse { .. }));
    }

    #[test]
    fn test_delete_missing_is_noop() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("registry.json");
        let mut store = FileStore::open(&path).unwrap();
        store.delete("Ghost").unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        store.save(&record("Alpha")).unwrap();
        store.save(&record("Alpha")).unwrap();
        assert_eq!(store.load_all().unwrap().len(), 1);
        store.delete("Alpha").unwrap();
        assert!(store.load_all().unwrap().is_empty());
    }
}
