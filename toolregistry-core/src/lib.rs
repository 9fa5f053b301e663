//! Toolregistry library exports
//!
//! Discovery, extraction, scoring and search over a catalog of
//! independently-authored command-line tools.

pub mod catalog;
pub mod config;
pub mod error;
pub mod export;
pub mod extract;
pub mod health;
pub mod probe;
pub mod record;
pub mod scan;
pub mod score;
pub mod search;
pub mod usage;

pub use catalog::{Catalog, CatalogStore, FileStore, MemoryStore};
pub use config::RegistryConfig;
pub use error::{RegistryError, Result};
pub use health::{HealthAggregator, HealthReport};
pub use record::{ToolRecord, ToolSummary};
pub use scan::{ScanReport, Scanner};
pub use score::QualityScorer;
pub use search::{SearchFilter, SearchIndex};
pub use usage::{UsageEvent, UsageStats};
