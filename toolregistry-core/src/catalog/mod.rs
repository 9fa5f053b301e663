//! Tool catalog
//!
//! The catalog maps tool names to records and owns the store that persists
//! them. Every mutation reaches the store before the in-memory map, so the
//! two never disagree after a successful call.
//!
//! # Architecture
//!
//! ```text
//! Scanner ──upsert──▶ Catalog ──save/delete──▶ CatalogStore
//!                       │                       ├── MemoryStore
//!                       │                       └── FileStore (registry.json)
//!                       ▼
//!        search / recommend / health (read-only)
//! ```

mod store;

pub use store::{CatalogStore, FileStore, MemoryStore, STORE_VERSION};

use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::record::ToolRecord;
use crate::usage::UsageEvent;

pub struct Catalog<S: CatalogStore> {
    store: S,
    records: BTreeMap<String, ToolRecord>,
}

impl Catalog<MemoryStore> {
    /// An empty catalog backed by memory only
    pub fn in_memory() -> Self {
        Self {
            store: MemoryStore::new(),
            records: BTreeMap::new(),
        }
    }
}

impl<S: CatalogStore> Catalog<S> {
    /// Load every record from `store`.
    ///
    /// Scores are recomputed on load, so a stored score never outlives a
    /// change to the scoring table.
    pub fn open(store: S) -> Result<Self, StoreError> {
        let mut records = BTreeMap::new();
        for mut record in store.load_all()? {
            record.rescore();
            records.insert(record.name.clone(), record);
        }
        debug!("Catalog opened with {} tools", records.len());
        Ok(Self { store, records })
    }

    /// Insert or replace a record by exact name
    pub fn upsert(&mut self, mut record: ToolRecord) -> Result<(), StoreError> {
        record.rescore();
        self.store.save(&record)?;
        self.records.insert(record.name.clone(), record);
        Ok(())
    }

    /// Exact name first, then case-insensitive
    pub fn get(&self, name: &str) -> Option<&ToolRecord> {
        self.records.get(name).or_else(|| {
            self.records
                .values()
                .find(|r| r.name.eq_ignore_ascii_case(name))
        })
    }

    /// All records, by name ascending
    pub fn list_all(&self) -> Vec<&ToolRecord> {
        self.records.values().collect()
    }

    pub fn by_category(&self, tag: &str) -> Vec<&ToolRecord> {
        self.records.values().filter(|r| r.in_category(tag)).collect()
    }

    /// Delete every record whose name is not in `seen`; returns the removed
    /// names in name order.
    pub fn remove_stale(&mut self, seen: &HashSet<String>) -> Result<Vec<String>, StoreError> {
        let stale: Vec<String> = self
            .records
            .keys()
            .filter(|name| !seen.contains(*name))
            .cloned()
            .collect();

        for name in &stale {
            self.store.delete(name)?;
            self.records.remove(name);
            info!("Removed stale tool: {}", name);
        }

        Ok(stale)
    }

    /// Tag → number of tools carrying it
    pub fn categories(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for record in self.records.values() {
            for category in &record.categories {
                *counts.entry(category.clone()).or_insert(0) += 1;
            }
        }
        counts
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn record_usage(&mut self, event: &UsageEvent) -> Result<(), StoreError> {
        self.store.append_usage(event)
    }

    pub fn usage(&self) -> Result<Vec<UsageEvent>, StoreError> {
        self.store.load_usage()
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
