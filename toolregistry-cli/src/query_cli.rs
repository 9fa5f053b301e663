//! Read-only catalog commands
//!
//! list, search, info, health, categories, export and recommend.

use anyhow::{Context, Result};
use clap::ValueEnum;
use std::path::Path;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

use toolregistry_core::{
    export, Catalog, FileStore, HealthAggregator, QualityScorer, RegistryError, SearchFilter,
    SearchIndex, ToolRecord,
};

const DESCRIPTION_WIDTH: usize = 60;

#[derive(Debug, Clone, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Json,
    #[value(alias = "md")]
    Markdown,
}

/// Table row for tool listings
#[derive(Tabled)]
struct ToolRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Quality")]
    quality: String,
    #[tabled(rename = "Categories")]
    categories: String,
    #[tabled(rename = "Description")]
    description: String,
}

impl From<&ToolRecord> for ToolRow {
    fn from(record: &ToolRecord) -> Self {
        Self {
            name: record.name.clone(),
            version: record.version.clone(),
            quality: format!("{} {}", record.quality_marker(), record.quality_score),
            categories: record.categories.join(", "),
            description: record.short_description(DESCRIPTION_WIDTH),
        }
    }
}

fn print_table<T: Tabled>(rows: &[T]) {
    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()))
        .to_string();
    println!("{table}");
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_records(records: &[&ToolRecord], json: bool) -> Result<()> {
    if json {
        return print_json(records);
    }
    let rows: Vec<ToolRow> = records.iter().map(|r| ToolRow::from(*r)).collect();
    print_table(&rows);
    Ok(())
}

pub fn execute_list(
    catalog: &Catalog<FileStore>,
    category: Option<String>,
    quality: Option<u8>,
    compact: bool,
    json: bool,
) -> Result<()> {
    let mut records: Vec<&ToolRecord> = match &category {
        Some(tag) => catalog.by_category(tag),
        None => catalog.list_all(),
    };
    if let Some(min) = quality {
        records.retain(|r| r.quality_score >= min);
    }
    records.sort_by(|a, b| {
        b.quality_score
            .cmp(&a.quality_score)
            .then_with(|| a.name.cmp(&b.name))
    });

    if records.is_empty() && !json {
        if catalog.is_empty() {
            println!("No tools cataloged. Run 'toolregistry scan' first.");
        } else {
            println!("No tools match the given filters.");
        }
        return Ok(());
    }

    if compact {
        for record in &records {
            println!(
                "{} {} ({})",
                record.quality_marker(),
                record.name,
                record.quality_score
            );
        }
        return Ok(());
    }

    print_records(&records, json)?;
    if !json {
        println!("{} tool(s)", records.len());
    }
    Ok(())
}

pub fn execute_search(
    catalog: &Catalog<FileStore>,
    query: &str,
    category: Option<String>,
    quality: Option<u8>,
    json: bool,
) -> Result<()> {
    let filter = SearchFilter {
        category,
        min_quality: quality,
    };
    let index = SearchIndex::from_catalog(catalog);
    let results = index.search_filtered(query, &filter);

    if results.is_empty() && !json {
        println!("No tools found matching '{query}'");
        return Ok(());
    }

    print_records(&results, json)
}

pub fn execute_info(catalog: &Catalog<FileStore>, name: &str, json: bool) -> Result<()> {
    let record = catalog.get(name).ok_or_else(|| RegistryError::NotFound {
        name: name.to_string(),
    })?;

    if json {
        return print_json(record);
    }

    let none = || "None".to_string();

    println!();
    println!("{} v{}", record.name, record.version);
    println!("{}", "=".repeat(record.name.len() + record.version.len() + 2));
    println!();
    if !record.description.is_empty() {
        println!("{}", record.description);
        println!();
    }
    if !record.author.is_empty() {
        println!("Author:       {}", record.author);
    }
    println!("Path:         {}", record.path.display());
    println!(
        "GitHub:       {}",
        record.github_url.clone().unwrap_or_else(none)
    );
    println!(
        "Quality:      {} {}/100",
        record.quality_marker(),
        record.quality_score
    );
    println!("Categories:   {}", join_or(&record.categories, "None"));
    println!("Capabilities: {}", join_or(&record.capabilities, "None"));
    println!("Commands:     {}", join_or(&record.cli_commands, "None"));
    println!(
        "Python API:   {}",
        record.python_api.clone().unwrap_or_else(none)
    );
    println!(
        "Dependencies: {}",
        join_or(&record.dependencies, "None (stdlib only)")
    );
    println!(
        "README:       {}",
        if record.has_readme {
            format!("yes ({} lines)", record.readme_lines)
        } else {
            "no".to_string()
        }
    );
    println!(
        "Tests:        {}",
        if record.has_tests {
            format!("yes ({} tests)", record.test_count)
        } else {
            "no".to_string()
        }
    );
    println!("Examples:     {}", yes_no(record.has_examples));
    println!("Branding:     {}", yes_no(record.has_branding));
    println!(
        "Modified:     {}",
        record.last_modified.format("%Y-%m-%d %H:%M")
    );

    println!();
    println!("Score breakdown:");
    for component in QualityScorer::breakdown(record) {
        println!("  +{:>3}  {}", component.points, component.signal);
    }

    Ok(())
}

pub fn execute_health(catalog: &Catalog<FileStore>, json: bool, top: usize) -> Result<()> {
    let report = HealthAggregator::report(catalog, top);

    if json {
        println!("{}", export::health_to_json(&report)?);
        return Ok(());
    }

    if report.is_empty() {
        println!("No tools discovered. Run 'toolregistry scan' first.");
        return Ok(());
    }

    println!();
    println!("Ecosystem Health");
    println!("================");
    println!();
    println!("Total tools:         {}", report.total_tools);
    println!("README coverage:     {}", percent(report.readme_coverage));
    println!("Test coverage:       {}", percent(report.test_coverage));
    println!("Examples coverage:   {}", percent(report.examples_coverage));
    println!("Branding coverage:   {}", percent(report.branding_coverage));
    println!("Average quality:     {:.1}/100", report.average_quality);
    println!("Average README:      {:.0} lines", report.average_readme_lines);
    println!("Average tests:       {:.1}", report.average_test_count);
    println!("High quality (>=80): {}", report.high_quality_count);
    println!("Needs work (<50):    {}", report.needs_work_count);

    if !report.top_quality.is_empty() {
        println!();
        println!("Top quality:");
        for tool in &report.top_quality {
            println!("  [OK] {} ({})", tool.name, tool.quality_score);
        }
    }

    if !report.needs_work.is_empty() {
        println!();
        println!("Needs work:");
        for tool in &report.needs_work {
            println!("  [X] {} ({})", tool.name, tool.quality_score);
        }
    }

    Ok(())
}

/// Table row for category counts
#[derive(Tabled)]
struct CategoryRow {
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Tools")]
    count: usize,
}

pub fn execute_categories(catalog: &Catalog<FileStore>) -> Result<()> {
    let mut rows: Vec<CategoryRow> = catalog
        .categories()
        .into_iter()
        .map(|(category, count)| CategoryRow { category, count })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.category.cmp(&b.category)));

    if rows.is_empty() {
        println!("No categories. Run 'toolregistry scan' first.");
        return Ok(());
    }

    print_table(&rows);
    Ok(())
}

pub fn execute_export(
    catalog: &Catalog<FileStore>,
    format: ExportFormat,
    output: Option<&Path>,
) -> Result<()> {
    let content = match format {
        ExportFormat::Json => export::to_json(&catalog.list_all())?,
        ExportFormat::Markdown => export::to_markdown(catalog, chrono::Utc::now())?,
    };

    match output {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write export to {}", path.display()))?;
            println!("[OK] Exported {} tools to {}", catalog.len(), path.display());
        }
        None => println!("{content}"),
    }

    Ok(())
}

/// Table row for recommendations
#[derive(Tabled)]
struct RecommendRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Relevance")]
    relevance: u32,
    #[tabled(rename = "Quality")]
    quality: String,
    #[tabled(rename = "Description")]
    description: String,
}

pub fn execute_recommend(catalog: &Catalog<FileStore>, task: &str) -> Result<()> {
    let index = SearchIndex::from_catalog(catalog);
    let scored = index.recommend_scored(task);

    if scored.is_empty() {
        println!("No tools match '{task}'. Consider building one.");
        return Ok(());
    }

    let rows: Vec<RecommendRow> = scored
        .iter()
        .map(|s| RecommendRow {
            name: s.record.name.clone(),
            relevance: s.relevance,
            quality: format!("{} {}", s.record.quality_marker(), s.record.quality_score),
            description: s.record.short_description(DESCRIPTION_WIDTH),
        })
        .collect();

    println!("Recommended for: {task}");
    print_table(&rows);
    Ok(())
}

fn join_or(items: &[String], empty: &str) -> String {
    if items.is_empty() {
        empty.to_string()
    } else {
        items.join(", ")
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

fn percent(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}
