//! Quality scoring
//!
//! A pure function of a record's completeness signals. The score is the sum
//! of independent contributions and is recomputed on every scan; nothing else
//! may set it.

use crate::record::ToolRecord;

const BASE: u32 = 10;
const DESCRIPTION: u32 = 10;
const README: u32 = 10;
/// (minimum README lines, points), cumulative
const README_TIERS: [(usize, u32); 3] = [(100, 5), (200, 5), (400, 10)];
const TESTS: u32 = 10;
/// (minimum test count, points), cumulative
const TEST_TIERS: [(usize, u32); 3] = [(5, 5), (10, 5), (15, 5)];
const EXAMPLES: u32 = 15;
const BRANDING: u32 = 10;

pub const MAX_SCORE: u8 = 100;

const fn tier_total(tiers: &[(usize, u32); 3]) -> u32 {
    tiers[0].1 + tiers[1].1 + tiers[2].1
}

// The table must add up to exactly 100 so the clamp in `score` never fires.
const _: () = assert!(
    BASE + DESCRIPTION
        + README
        + tier_total(&README_TIERS)
        + TESTS
        + tier_total(&TEST_TIERS)
        + EXAMPLES
        + BRANDING
        == MAX_SCORE as u32
);

/// One awarded signal and its points
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreComponent {
    pub signal: String,
    pub points: u32,
}

pub struct QualityScorer;

impl QualityScorer {
    /// Score a record, 0..=100
    pub fn score(record: &ToolRecord) -> u8 {
        let total: u32 = Self::breakdown(record).iter().map(|c| c.points).sum();
        total.min(MAX_SCORE as u32) as u8
    }

    /// Every awarded signal, in table order
    pub fn breakdown(record: &ToolRecord) -> Vec<ScoreComponent> {
        let mut parts = vec![component("base", BASE)];

        if !record.description.trim().is_empty() {
            parts.push(component("description", DESCRIPTION));
        }

        if record.has_readme {
            parts.push(component("README", README));
            for (min_lines, points) in README_TIERS {
                if record.readme_lines >= min_lines {
                    parts.push(component(&format!("README >= {min_lines} lines"), points));
                }
            }
        }

        if record.has_tests {
            parts.push(component("tests", TESTS));
            for (min_tests, points) in TEST_TIERS {
                if record.test_count >= min_tests {
                    parts.push(component(&format!("tests >= {min_tests}"), points));
                }
            }
        }

        if record.has_examples {
            parts.push(component("examples", EXAMPLES));
        }

        if record.has_branding {
            parts.push(component("branding", BRANDING));
        }

        parts
    }
}

fn component(signal: &str, points: u32) -> ScoreComponent {
    ScoreComponent {
        signal: signal.to_string(),
        points,
    }
}
