//! Tool launching and usage statistics

use anyhow::{Context, Result};
use tracing::{info, warn};

use toolregistry_core::probe::find_primary_script;
use toolregistry_core::{Catalog, FileStore, RegistryConfig, RegistryError, UsageEvent, UsageStats};

/// Run a tool's primary script with the configured interpreter.
///
/// stdio is inherited. Returns the child's exit code (1 if it was killed by
/// a signal).
pub async fn execute_launch(
    config: &RegistryConfig,
    catalog: &mut Catalog<FileStore>,
    name: &str,
    agent: Option<String>,
    args: &[String],
) -> Result<i32> {
    let record = catalog
        .get(name)
        .cloned()
        .ok_or_else(|| RegistryError::NotFound {
            name: name.to_string(),
        })?;

    let script = find_primary_script(&record.path)
        .with_context(|| format!("Failed to read tool directory {}", record.path.display()))?
        .with_context(|| {
            format!(
                "{} no longer has a primary script. Run 'toolregistry scan' to refresh.",
                record.name
            )
        })?;

    info!(
        "Launching {} with {} {}",
        record.name,
        config.interpreter,
        script.display()
    );

    let status = tokio::process::Command::new(&config.interpreter)
        .arg(&script)
        .args(args)
        .current_dir(&record.path)
        .status()
        .await;

    let (code, notes) = match &status {
        Ok(status) => (status.code().unwrap_or(1), format!("exit {status}")),
        Err(err) => (1, format!("failed to start: {err}")),
    };

    if config.track_usage {
        let event = UsageEvent::new(record.name.clone(), "launch", code == 0)
            .with_agent(agent.unwrap_or_default())
            .with_notes(notes);
        if let Err(err) = catalog.record_usage(&event) {
            warn!("Failed to record usage for {}: {}", record.name, err);
        }
    }

    status.with_context(|| format!("Failed to start {}", config.interpreter))?;
    Ok(code)
}

pub fn execute_stats(catalog: &Catalog<FileStore>, tool: Option<&str>) -> Result<()> {
    let events = catalog.usage().context("Failed to load usage history")?;
    let stats = UsageStats::from_events(&events, tool);

    println!();
    match tool {
        Some(tool) => println!("Usage Statistics: {tool}"),
        None => println!("Usage Statistics"),
    }
    println!("================");
    println!();
    println!("Total uses:   {}", stats.total_uses);
    println!("Successful:   {}", stats.successful);
    println!("Success rate: {:.1}%", stats.success_rate);

    if !stats.top_tools.is_empty() {
        println!();
        println!("Most used:");
        for (name, count) in &stats.top_tools {
            println!("  {name}: {count}");
        }
    }

    Ok(())
}
