//! Search and recommendation
//!
//! Search is a case-insensitive substring filter. Recommendation scores each
//! record against the keywords of a task description:
//!
//! ```text
//! relevance = Σ keyword ( 4 × occurrences in name
//!                       + 2 × category hits
//!                       + 1 × occurrences in description )
//! ```
//!
//! Both are read-only views over the catalog.

use std::cmp::Ordering;

use crate::catalog::{Catalog, CatalogStore};
use crate::extract::rules::category_triggers;
use crate::record::ToolRecord;

/// Most recommendations returned
pub const MAX_RECOMMENDATIONS: usize = 5;

const NAME_WEIGHT: u32 = 4;
const CATEGORY_WEIGHT: u32 = 2;
const DESCRIPTION_WEIGHT: u32 = 1;

/// Shortest trigger a longer keyword may extend
const MIN_STEM_LEN: usize = 4;

const STOP_WORDS: &[&str] = &[
    "an", "and", "any", "are", "as", "at", "be", "by", "can", "do", "for", "from", "get",
    "how", "in", "into", "is", "it", "me", "my", "need", "of", "on", "or", "our", "so",
    "some", "that", "the", "this", "to", "tool", "tools", "use", "want", "we", "with", "you",
];

/// Optional narrowing for `search_filtered`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    pub category: Option<String>,
    pub min_quality: Option<u8>,
}

impl SearchFilter {
    fn accepts(&self, record: &ToolRecord) -> bool {
        self.category
            .as_deref()
            .map_or(true, |tag| record.in_category(tag))
            && self.min_quality.map_or(true, |min| record.quality_score >= min)
    }
}

/// A recommendation with its relevance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scored<'a> {
    pub record: &'a ToolRecord,
    pub relevance: u32,
}

/// Query view over a set of records
pub struct SearchIndex<'a> {
    records: Vec<&'a ToolRecord>,
}

impl<'a> SearchIndex<'a> {
    pub fn new(records: Vec<&'a ToolRecord>) -> Self {
        Self { records }
    }

    pub fn from_catalog<S: CatalogStore>(catalog: &'a Catalog<S>) -> Self {
        Self::new(catalog.list_all())
    }

    /// Records matching `query` anywhere, best quality first
    pub fn search(&self, query: &str) -> Vec<&'a ToolRecord> {
        self.search_filtered(query, &SearchFilter::default())
    }

    pub fn search_filtered(&self, query: &str, filter: &SearchFilter) -> Vec<&'a ToolRecord> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }

        let mut results: Vec<&'a ToolRecord> = self
            .records
            .iter()
            .copied()
            .filter(|r| matches_query(r, &query) && filter.accepts(r))
            .collect();

        results.sort_by(|a, b| by_quality_then_name(a, b));
        results
    }

    /// Up to five records most relevant to `task`
    pub fn recommend(&self, task: &str) -> Vec<&'a ToolRecord> {
        self.recommend_scored(task)
            .into_iter()
            .map(|s| s.record)
            .collect()
    }

    /// `recommend` with relevance scores attached
    pub fn recommend_scored(&self, task: &str) -> Vec<Scored<'a>> {
        let keywords = keywords(task);
        if keywords.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<Scored<'a>> = self
            .records
            .iter()
            .map(|&record| Scored {
                record,
                relevance: relevance(record, &keywords),
            })
            .filter(|s| s.relevance > 0)
            .collect();

        scored.sort_by(|a, b| {
            b.relevance
                .cmp(&a.relevance)
                .then_with(|| by_quality_then_name(a.record, b.record))
        });
        scored.truncate(MAX_RECOMMENDATIONS);
        scored
    }
}

fn matches_query(record: &ToolRecord, query: &str) -> bool {
    record.name.to_lowercase().contains(query)
        || record.description.to_lowercase().contains(query)
        || record
            .categories
            .iter()
            .any(|c| c.to_lowercase().contains(query))
        || record
            .capabilities
            .iter()
            .any(|c| c.to_lowercase().contains(query))
}

fn by_quality_then_name(a: &ToolRecord, b: &ToolRecord) -> Ordering {
    b.quality_score
        .cmp(&a.quality_score)
        .then_with(|| a.name.cmp(&b.name))
}

/// Lowercase alphanumeric tokens of two or more characters, stop words
/// removed, first occurrence kept
pub fn keywords(text: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for token in text.split(|c: char| !c.is_alphanumeric()) {
        let token = token.to_lowercase();
        if token.chars().count() < 2 || STOP_WORDS.contains(&token.as_str()) {
            continue;
        }
        if !out.contains(&token) {
            out.push(token);
        }
    }
    out
}

/// A keyword triggers a category when it equals one of the tag's triggers,
/// or extends a trigger of at least `MIN_STEM_LEN` characters ("messages",
/// "scanning"). Short triggers like `log` or `net` must match exactly.
fn triggers_category(tag: &str, keyword: &str) -> bool {
    category_triggers(tag)
        .iter()
        .any(|t| keyword == *t || (t.len() >= MIN_STEM_LEN && keyword.starts_with(t)))
}

fn relevance(record: &ToolRecord, keywords: &[String]) -> u32 {
    let name = record.name.to_lowercase();
    let description = record.description.to_lowercase();
    let categories: Vec<String> = record.categories.iter().map(|c| c.to_lowercase()).collect();

    keywords
        .iter()
        .map(|kw| {
            let in_name = name.matches(kw.as_str()).count() as u32;
            let in_description = description.matches(kw.as_str()).count() as u32;
            let category_hits = categories
                .iter()
                .filter(|c| c.contains(kw.as_str()) || triggers_category(c, kw))
                .count() as u32;

            NAME_WEIGHT * in_name
                + CATEGORY_WEIGHT * category_hits
                + DESCRIPTION_WEIGHT * in_description
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(name: &str, description: &str, categories: &[&str], score: u8) -> ToolRecord {
        let mut record = ToolRecord::placeholder(name, format!("/tools/{name}"));
        record.description = description.to_string();
        record.categories = categories.iter().map(|c| c.to_string()).collect();
        record.quality_score = score;
        record
    }

    fn fixture() -> Vec<ToolRecord> {
        vec![
            record("SynapseLink", "Send messages between agents", &["synapse"], 92),
            record("SynapseWatcher", "Watch the synapse inbox", &["synapse", "monitoring"], 88),
            record("TaskQueuePro", "Priority task queue", &["task"], 75),
            record("PortManager", "Find free ports", &["network"], 40),
        ]
    }

    #[test]
    fn test_search_by_category_orders_by_quality() {
        let records = fixture();
        let index = SearchIndex::new(records.iter().collect());

        let scores: Vec<u8> = index
            .search("synapse")
            .iter()
            .map(|r| r.quality_score)
            .collect();
        assert_eq!(scores, vec![92, 88]);
    }

    #[test]
    fn test_search_results_satisfy_substring_test() {
        let records = fixture();
        let index = SearchIndex::new(records.iter().collect());

        for query in ["task", "PORT", "inbox", "a"] {
            let q = query.to_lowercase();
            for r in index.search(query) {
                assert!(matches_query(r, &q), "{} does not match {}", r.name, query);
            }
        }
    }

    #[test]
    fn test_search_blank_query_is_empty() {
        let records = fixture();
        let index = SearchIndex::new(records.iter().collect());
        assert!(index.search("   ").is_empty());
    }

    #[test]
    fn test_search_filtered() {
        let records = fixture();
        let index = SearchIndex::new(records.iter().collect());

        let filter = SearchFilter {
            category: Some("monitoring".to_string()),
            min_quality: None,
        };
        let names: Vec<&str> = index
            .search_filtered("synapse", &filter)
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(names, vec!["SynapseWatcher"]);

        let filter = SearchFilter {
            category: None,
            min_quality: Some(90),
        };
        assert_eq!(index.search_filtered("synapse", &filter).len(), 1);
    }

    #[test]
    fn test_keywords() {
        assert_eq!(
            keywords("I need to send a Message, send it NOW!"),
            vec!["send", "message", "now"]
        );
        assert!(keywords("a I . ,").is_empty());
    }

    #[test]
    fn test_recommend_uses_category_synonyms() {
        let records = fixture();
        let index = SearchIndex::new(records.iter().collect());

        let names: Vec<&str> = index
            .recommend("deliver a message")
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        // "messages" in SynapseLink's description adds one point on top of
        // the synapse category hit
        assert_eq!(names, vec!["SynapseLink", "SynapseWatcher"]);
    }

    #[test]
    fn test_short_triggers_need_whole_word() {
        assert!(triggers_category("dev", "log"));
        assert!(!triggers_category("dev", "catalog"));
        assert!(!triggers_category("network", "report"));
        assert!(triggers_category("network", "scanning"));
        assert!(triggers_category("synapse", "messages"));

        let records = vec![record("PortMapper", "", &["network"], 80)];
        let index = SearchIndex::new(records.iter().collect());
        assert!(index.recommend("weekly report").is_empty());
        assert_eq!(index.recommend("port").len(), 1);
    }

    #[test]
    fn test_recommend_ordering_and_cap() {
        let mut records = fixture();
        for i in 0..6 {
            records.push(record(&format!("Queue{i}"), "", &["task"], 50));
        }
        let index = SearchIndex::new(records.iter().collect());

        let scored = index.recommend_scored("queue");
        assert!(scored.len() <= MAX_RECOMMENDATIONS);
        for pair in scored.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(
                a.relevance > b.relevance
                    || (a.relevance == b.relevance
                        && by_quality_then_name(a.record, b.record) != Ordering::Greater)
            );
        }
        assert_eq!(scored[0].record.name, "TaskQueuePro");
    }

    #[test]
    fn test_recommend_nonsense_is_empty() {
        let records = fixture();
        let index = SearchIndex::new(records.iter().collect());
        assert!(index.recommend("xyzzy qwrtp").is_empty());
        assert!(index.recommend("").is_empty());
    }
}
