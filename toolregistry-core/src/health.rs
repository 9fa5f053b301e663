//! Ecosystem health
//!
//! Coverage and quality statistics over the whole catalog.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog::{Catalog, CatalogStore};
use crate::record::{ToolRecord, ToolSummary};

/// Score at or above which a tool counts as high quality
pub const HIGH_QUALITY: u8 = 80;

/// Score below which a tool needs work
pub const NEEDS_WORK: u8 = 50;

/// Default length of the top/needs-work lists
pub const DEFAULT_TOP: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub total_tools: usize,
    /// Fraction in [0, 1]
    pub readme_coverage: f64,
    pub test_coverage: f64,
    pub examples_coverage: f64,
    pub branding_coverage: f64,
    pub average_quality: f64,
    pub average_readme_lines: f64,
    pub average_test_count: f64,
    pub high_quality_count: usize,
    pub needs_work_count: usize,
    pub categories: BTreeMap<String, usize>,
    /// Best first, name ascending on ties
    pub top_quality: Vec<ToolSummary>,
    /// Worst first, name ascending on ties
    pub needs_work: Vec<ToolSummary>,
}

impl HealthReport {
    pub fn is_empty(&self) -> bool {
        self.total_tools == 0
    }
}

pub struct HealthAggregator;

impl HealthAggregator {
    pub fn report<S: CatalogStore>(catalog: &Catalog<S>, top: usize) -> HealthReport {
        Self::from_records(&catalog.list_all(), top)
    }

    pub fn from_records(records: &[&ToolRecord], top: usize) -> HealthReport {
        if records.is_empty() {
            return HealthReport::default();
        }

        let total = records.len() as f64;
        let fraction = |pred: fn(&ToolRecord) -> bool| {
            records.iter().filter(|r| pred(r)).count() as f64 / total
        };
        let mean = |value: fn(&ToolRecord) -> f64| {
            records.iter().map(|r| value(r)).sum::<f64>() / total
        };

        let mut categories = BTreeMap::new();
        for record in records {
            for category in &record.categories {
                *categories.entry(category.clone()).or_insert(0) += 1;
            }
        }

        let mut by_quality: Vec<&ToolRecord> = records.to_vec();
        by_quality.sort_by(|a, b| {
            b.quality_score
                .cmp(&a.quality_score)
                .then_with(|| a.name.cmp(&b.name))
        });
        let top_quality = by_quality.iter().take(top).map(|r| r.summary()).collect();

        let mut weak: Vec<&ToolRecord> = records
            .iter()
            .copied()
            .filter(|r| r.quality_score < NEEDS_WORK)
            .collect();
        weak.sort_by(|a, b| {
            a.quality_score
                .cmp(&b.quality_score)
                .then_with(|| a.name.cmp(&b.name))
        });
        let needs_work_count = weak.len();
        let needs_work = weak.iter().take(top).map(|r| r.summary()).collect();

        HealthReport {
            total_tools: records.len(),
            readme_coverage: fraction(|r| r.has_readme),
            test_coverage: fraction(|r| r.has_tests),
            examples_coverage: fraction(|r| r.has_examples),
            branding_coverage: fraction(|r| r.has_branding),
            average_quality: mean(|r| f64::from(r.quality_score)),
            average_readme_lines: mean(|r| r.readme_lines as f64),
            average_test_count: mean(|r| r.test_count as f64),
            high_quality_count: records
                .iter()
                .filter(|r| r.quality_score >= HIGH_QUALITY)
                .count(),
            needs_work_count,
            categories,
            top_quality,
            needs_work,
        }
    }
}
