//! Tool records
//!
//! One `ToolRecord` per discovered tool directory. A record is built or
//! replaced wholesale on every scan; nothing is merged with a previous version.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::score::QualityScorer;

/// Version assigned when a tool declares none
pub const DEFAULT_VERSION: &str = "0.1.0";

/// Everything the registry knows about one tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolRecord {
    /// Directory name, unique within the catalog
    pub name: String,

    /// Declared version, or `DEFAULT_VERSION`
    pub version: String,

    /// First line of the primary script's leading docstring
    #[serde(default)]
    pub description: String,

    /// `Author:` line of the leading docstring
    #[serde(default)]
    pub author: String,

    /// Absolute path of the tool directory, symlinks resolved
    pub path: PathBuf,

    /// Where the scan found the tool, before symlinks are resolved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub found_at: Option<PathBuf>,

    /// GitHub repository linked from the README
    #[serde(default)]
    pub github_url: Option<String>,

    /// Controlled-vocabulary tags
    #[serde(default)]
    pub categories: Vec<String>,

    /// Detected integration surface
    #[serde(default)]
    pub capabilities: Vec<String>,

    /// Subcommands registered by the primary script, in source order
    #[serde(default)]
    pub cli_commands: Vec<String>,

    /// Import statement for the tool's Python API
    #[serde(default)]
    pub python_api: Option<String>,

    #[serde(default)]
    pub has_readme: bool,

    #[serde(default)]
    pub readme_lines: usize,

    #[serde(default)]
    pub has_tests: bool,

    #[serde(default)]
    pub test_count: usize,

    #[serde(default)]
    pub has_examples: bool,

    #[serde(default)]
    pub has_branding: bool,

    /// Third-party imports; empty means standard library only
    #[serde(default)]
    pub dependencies: Vec<String>,

    /// Always `QualityScorer::score(self)`
    #[serde(default)]
    pub quality_score: u8,

    /// Newest mtime among the files read during extraction
    pub last_modified: DateTime<Utc>,
}

impl ToolRecord {
    /// A record carrying only identity, used when extraction fails so the
    /// tool stays discoverable.
    pub fn placeholder(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        let mut record = Self {
            name: name.into(),
            version: DEFAULT_VERSION.to_string(),
            description: String::new(),
            author: String::new(),
            path: path.into(),
            found_at: None,
            github_url: None,
            categories: Vec::new(),
            capabilities: Vec::new(),
            cli_commands: Vec::new(),
            python_api: None,
            has_readme: false,
            readme_lines: 0,
            has_tests: false,
            test_count: 0,
            has_examples: false,
            has_branding: false,
            dependencies: Vec::new(),
            quality_score: 0,
            last_modified: DateTime::<Utc>::default(),
        };
        record.rescore();
        record
    }

    /// Path stale pruning checks against the scanned roots
    pub fn scan_path(&self) -> &Path {
        self.found_at.as_deref().unwrap_or(&self.path)
    }

    /// Recompute `quality_score` from the other fields
    pub fn rescore(&mut self) {
        self.quality_score = QualityScorer::score(self);
    }

    pub fn in_category(&self, tag: &str) -> bool {
        self.categories.iter().any(|c| c.eq_ignore_ascii_case(tag))
    }

    /// Name and score only
    pub fn summary(&self) -> ToolSummary {
        ToolSummary {
            name: self.name.clone(),
            quality_score: self.quality_score,
        }
    }

    /// Description truncated to `max` characters with an ellipsis
    pub fn short_description(&self, max: usize) -> String {
        if self.description.chars().count() <= max {
            return self.description.clone();
        }
        let cut: String = self.description.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut.trim_end())
    }

    /// Traffic-light marker used by the CLI and the Markdown export
    pub fn quality_marker(&self) -> &'static str {
        match self.quality_score {
            80.. => "[OK]",
            50..=79 => "[!]",
            _ => "[X]",
        }
    }
}

/// Name plus score, as listed in health reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSummary {
    pub name: String,
    pub quality_score: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_has_base_score() {
        let record = ToolRecord::placeholder("Broken", "/tools/Broken");
        assert_eq!(record.version, "0.1.0");
        assert_eq!(record.quality_score, 10);
        assert!(record.categories.is_empty());
    }

    #[test]
    fn test_in_category_is_case_insensitive() {
        let mut record = ToolRecord::placeholder("SynapseLink", "/tools/SynapseLink");
        record.categories = vec!["synapse".to_string()];
        assert!(record.in_category("Synapse"));
        assert!(!record.in_category("task"));
    }

    #[test]
    fn test_short_description() {
        let mut record = ToolRecord::placeholder("T", "/t");
        record.description = "A fairly long description of a tool".to_string();
        assert_eq!(record.short_description(100), record.description);
        assert_eq!(record.short_description(11), "A fairly...");
    }

    #[test]
    fn test_scan_path_prefers_found_at() {
        let mut record = ToolRecord::placeholder("Linked", "/elsewhere/Linked");
        assert_eq!(record.scan_path(), Path::new("/elsewhere/Linked"));
        record.found_at = Some(PathBuf::from("/tools/Linked"));
        assert_eq!(record.scan_path(), Path::new("/tools/Linked"));
    }

    #[test]
    fn test_quality_marker() {
        let mut record = ToolRecord::placeholder("T", "/t");
        record.quality_score = 85;
        assert_eq!(record.quality_marker(), "[OK]");
        record.quality_score = 50;
        assert_eq!(record.quality_marker(), "[!]");
        record.quality_score = 49;
        assert_eq!(record.quality_marker(), "[X]");
    }
}
