//! Usage tracking
//!
//! Events are appended to the catalog store; statistics are computed on
//! demand from the full event list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Maximum entries in `UsageStats::top_tools`
pub const TOP_TOOLS: usize = 10;

/// One recorded use of a tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageEvent {
    pub tool_name: String,
    /// What was done, e.g. `launch`
    pub action: String,
    /// Who did it
    #[serde(default)]
    pub agent: String,
    pub timestamp: DateTime<Utc>,
    pub success: bool,
    #[serde(default)]
    pub notes: String,
}

impl UsageEvent {
    pub fn new(tool_name: impl Into<String>, action: impl Into<String>, success: bool) -> Self {
        Self {
            tool_name: tool_name.into(),
            action: action.into(),
            agent: String::new(),
            timestamp: Utc::now(),
            success,
            notes: String::new(),
        }
    }

    pub fn with_agent(mut self, agent: impl Into<String>) -> Self {
        self.agent = agent.into();
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageStats {
    /// Events counted (filtered by tool when one is given)
    pub total_uses: usize,
    pub successful: usize,
    /// Percentage, 0 when there are no events
    pub success_rate: f64,
    /// Most used tools across all events, count descending then name
    pub top_tools: Vec<(String, usize)>,
}

impl UsageStats {
    pub fn from_events(events: &[UsageEvent], tool: Option<&str>) -> Self {
        let counted: Vec<&UsageEvent> = events
            .iter()
            .filter(|e| tool.map_or(true, |t| e.tool_name.eq_ignore_ascii_case(t)))
            .collect();

        let total_uses = counted.len();
        let successful = counted.iter().filter(|e| e.success).count();
        let success_rate = if total_uses == 0 {
            0.0
        } else {
            successful as f64 / total_uses as f64 * 100.0
        };

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for event in events {
            *counts.entry(event.tool_name.as_str()).or_default() += 1;
        }
        let mut top_tools: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(name, count)| (name.to_string(), count))
            .collect();
        top_tools.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        top_tools.truncate(TOP_TOOLS);

        Self {
            total_uses,
            successful,
            success_rate,
            top_tools,
        }
    }
}
