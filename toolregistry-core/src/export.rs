//! JSON and Markdown export

use chrono::{DateTime, Utc};
use std::fmt::{self, Write};

use crate::catalog::{Catalog, CatalogStore};
use crate::health::HealthReport;
use crate::record::ToolRecord;

/// Heading for tools with no category
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Pretty JSON array of records
pub fn to_json(records: &[&ToolRecord]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(records)
}

pub fn from_json(json: &str) -> serde_json::Result<Vec<ToolRecord>> {
    serde_json::from_str(json)
}

pub fn health_to_json(report: &HealthReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

/// Markdown document grouped by category, largest category first
pub fn to_markdown<S: CatalogStore>(
    catalog: &Catalog<S>,
    generated_at: DateTime<Utc>,
) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "# Tool Registry")?;
    writeln!(out)?;
    writeln!(out, "**Total Tools:** {}", catalog.len())?;
    writeln!(
        out,
        "**Generated:** {}",
        generated_at.format("%Y-%m-%d %H:%M UTC")
    )?;
    writeln!(out)?;
    writeln!(out, "---")?;

    let mut categories: Vec<(String, usize)> = catalog.categories().into_iter().collect();
    categories.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    for (category, count) in &categories {
        let tools = catalog.by_category(category);
        write_section(&mut out, &title_case(category), *count, &tools)?;
    }

    let uncategorized: Vec<&ToolRecord> = catalog
        .list_all()
        .into_iter()
        .filter(|r| r.categories.is_empty())
        .collect();
    if !uncategorized.is_empty() {
        write_section(&mut out, UNCATEGORIZED, uncategorized.len(), &uncategorized)?;
    }

    Ok(out)
}

fn write_section(
    out: &mut String,
    heading: &str,
    count: usize,
    tools: &[&ToolRecord],
) -> fmt::Result {
    let noun = if count == 1 { "tool" } else { "tools" };
    writeln!(out)?;
    writeln!(out, "## {heading} ({count} {noun})")?;

    for tool in tools {
        writeln!(out)?;
        writeln!(out, "### {} {}", tool.name, tool.quality_marker())?;
        let description = if tool.description.is_empty() {
            "_No description_"
        } else {
            tool.description.as_str()
        };
        writeln!(out, "- **Description:** {description}")?;
        writeln!(out, "- **Version:** {}", tool.version)?;
        writeln!(out, "- **Quality:** {}/100", tool.quality_score)?;
        if let Some(url) = &tool.github_url {
            writeln!(out, "- **GitHub:** [{}]({})", tool.name, url)?;
        }
        if !tool.cli_commands.is_empty() {
            writeln!(out, "- **Commands:** {}", tool.cli_commands.join(", "))?;
        }
    }
    Ok(())
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
