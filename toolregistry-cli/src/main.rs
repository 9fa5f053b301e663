//! toolregistry - discover, search and launch cataloged command-line tools
//!
//! Main entry point: argument parsing, logging setup and dispatch.

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use toolregistry_core::{Catalog, FileStore, RegistryConfig, Scanner};

mod launch_cli;
mod query_cli;

/// Log levels
#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Parser, Debug)]
#[clap(
    name = "toolregistry",
    about = "Catalog, search and launch command-line tools",
    version
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,

    /// Set log level
    #[clap(long, default_value = "warn", global = true)]
    log_level: LogLevel,

    /// Emit logs as JSON
    #[clap(long, global = true)]
    log_json: bool,

    /// Override configuration file path
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    /// Override catalog store path
    #[clap(long, global = true)]
    catalog: Option<PathBuf>,
}

#[derive(Parser, Debug)]
enum Command {
    /// Scan tool directories and update the catalog
    Scan {
        /// Root to scan (repeatable; defaults to scan_paths from config)
        #[clap(long = "path", short = 'p')]
        paths: Vec<PathBuf>,
    },

    /// List cataloged tools
    List {
        /// Only tools in this category
        #[clap(long, short)]
        category: Option<String>,

        /// Minimum quality score
        #[clap(long, short)]
        quality: Option<u8>,

        /// One line per tool
        #[clap(long, conflicts_with = "json")]
        compact: bool,

        /// Output as JSON
        #[clap(long)]
        json: bool,
    },

    /// Search tools by name, description, category or capability
    Search {
        query: String,

        /// Only tools in this category
        #[clap(long, short)]
        category: Option<String>,

        /// Minimum quality score
        #[clap(long, short)]
        quality: Option<u8>,

        /// Output as JSON
        #[clap(long)]
        json: bool,
    },

    /// Show everything known about one tool
    Info {
        name: String,

        /// Output as JSON
        #[clap(long)]
        json: bool,
    },

    /// Run a tool's primary script
    Launch {
        name: String,

        /// Who is launching, recorded in usage stats
        #[clap(long)]
        agent: Option<String>,

        /// Arguments passed through to the tool
        #[clap(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Coverage and quality report
    Health {
        /// Output as JSON
        #[clap(long)]
        json: bool,

        /// Length of the top and needs-work lists
        #[clap(long, default_value_t = toolregistry_core::health::DEFAULT_TOP)]
        top: usize,
    },

    /// Tool count per category
    Categories,

    /// Export the catalog
    Export {
        #[clap(long, short, value_enum, default_value = "json")]
        format: query_cli::ExportFormat,

        /// Write to a file instead of stdout
        #[clap(long, short)]
        output: Option<PathBuf>,
    },

    /// Recommend tools for a task description
    Recommend {
        task: String,
    },

    /// Usage statistics
    Stats {
        /// Only count launches of this tool
        #[clap(long)]
        tool: Option<String>,
    },
}

/// Initialize tracing with CLI flags
///
/// Logs always go to stderr so command output on stdout stays parseable.
fn initialize_tracing(log_level: &LogLevel, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_filter_directive()));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn load_config(path: Option<&Path>) -> Result<RegistryConfig> {
    let config = match path {
        Some(path) => RegistryConfig::load_from_path(path),
        None => RegistryConfig::load(),
    };
    config.context("Failed to load configuration")
}

fn open_catalog(config: &RegistryConfig, path: Option<&Path>) -> Result<Catalog<FileStore>> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => config.resolved_catalog_path()?,
    };
    debug!("Using catalog store {}", path.display());

    let store = FileStore::open(&path)
        .with_context(|| format!("Failed to open catalog at {}", path.display()))?;
    Ok(Catalog::open(store)?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    initialize_tracing(&cli.log_level, cli.log_json);

    let config = load_config(cli.config.as_deref())?;
    let mut catalog = open_catalog(&config, cli.catalog.as_deref())?;

    match cli.command {
        Command::Scan { paths } => scan_command(&config, &mut catalog, paths).await,
        Command::List {
            category,
            quality,
            compact,
            json,
        } => query_cli::execute_list(&catalog, category, quality, compact, json),
        Command::Search {
            query,
            category,
            quality,
            json,
        } => query_cli::execute_search(&catalog, &query, category, quality, json),
        Command::Info { name, json } => query_cli::execute_info(&catalog, &name, json),
        Command::Launch { name, agent, args } => {
            let code = launch_cli::execute_launch(&config, &mut catalog, &name, agent, &args).await?;
            std::process::exit(code);
        }
        Command::Health { json, top } => query_cli::execute_health(&catalog, json, top),
        Command::Categories => query_cli::execute_categories(&catalog),
        Command::Export { format, output } => {
            query_cli::execute_export(&catalog, format, output.as_deref())
        }
        Command::Recommend { task } => query_cli::execute_recommend(&catalog, &task),
        Command::Stats { tool } => launch_cli::execute_stats(&catalog, tool.as_deref()),
    }
}

async fn scan_command(
    config: &RegistryConfig,
    catalog: &mut Catalog<FileStore>,
    paths: Vec<PathBuf>,
) -> Result<()> {
    let roots = if paths.is_empty() {
        config.scan_paths.clone()
    } else {
        paths
    };

    if roots.is_empty() {
        bail!(
            "No scan paths given.\n\nPass --path <DIR> or set scan_paths in the config file."
        );
    }

    let report = Scanner::new(config).scan(catalog, &roots).await?;

    println!("[OK] Scanned {} root(s)", roots.len() - report.missing_roots.len());
    println!("     Tools cataloged: {}", report.upserted);
    if report.degraded > 0 {
        println!("     Unreadable (placeholder): {}", report.degraded);
    }
    if report.probe_errors > 0 {
        println!("     Unreadable entries skipped: {}", report.probe_errors);
    }
    for root in &report.missing_roots {
        println!("[!] Missing root: {}", root.display());
    }
    if !report.removed.is_empty() {
        println!("     Removed stale: {}", report.removed.join(", "));
    }
    println!("     Catalog size: {}", catalog.len());

    Ok(())
}
