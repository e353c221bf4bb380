//! Textbook-Harvest main entry point
//!
//! This is the command-line interface for the textbook catalog harvester.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use textbook_harvest::config::{load_or_default, Config};
use textbook_harvest::crawler::harvest;
use textbook_harvest::output::{load_records, JsonLinesReporter};
use textbook_harvest::pipeline;
use tracing_subscriber::EnvFilter;

/// Textbook-Harvest: a regional textbook catalog harvester
///
/// Crawls the province / city / district textbook catalog in parallel,
/// exports the raw records to CSV, then deduplicates, cleans and sorts them
/// and prints summary statistics.
#[derive(Parser, Debug)]
#[command(name = "textbook-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A regional textbook catalog harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Also write the processed records to this CSV file
    #[arg(long, value_name = "FILE")]
    processed: Option<PathBuf>,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Process an existing raw CSV export, print statistics and exit
    #[arg(long, value_name = "CSV", conflicts_with = "dry_run")]
    stats: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = load_or_default(cli.config.as_deref()).with_context(|| match &cli.config {
        Some(path) => format!("Failed to load configuration from {}", path.display()),
        None => "Default configuration is invalid".to_string(),
    })?;

    if let Some(path) = &cli.processed {
        config.output.processed_csv_path = Some(path.display().to_string());
    }

    if cli.dry_run {
        handle_dry_run(&config);
    } else if let Some(path) = &cli.stats {
        handle_stats(path)?;
    } else {
        handle_harvest(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("textbook_harvest=info,warn"),
            1 => EnvFilter::new("textbook_harvest=debug,info"),
            2 => EnvFilter::new("textbook_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Textbook-Harvest Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Root URL: {}", config.crawler.root_url);
    println!("  Base URL: {}", config.crawler.base_url);
    println!("  Worker count: {}", config.crawler.worker_count);
    println!("  District delay: {}ms", config.crawler.district_delay_ms);
    println!(
        "  Shutdown grace: {}s (+{}s forced)",
        config.crawler.shutdown_grace_secs, config.crawler.shutdown_force_secs
    );

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.value);

    println!("\nOutput:");
    println!("  Raw CSV: {}", config.output.raw_csv_path);
    match &config.output.processed_csv_path {
        Some(path) => println!("  Processed CSV: {}", path),
        None => println!("  Processed CSV: (not written)"),
    }
    println!("  Error log: {}", config.output.error_log_path);

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: processes an existing raw export
fn handle_stats(path: &std::path::Path) -> anyhow::Result<()> {
    println!("Raw export: {}\n", path.display());

    let raw = load_records(path)
        .with_context(|| format!("Failed to read raw export {}", path.display()))?;

    let processed = pipeline::process(raw);
    let stats = pipeline::compute_statistics(&processed);
    pipeline::print_statistics(&stats);

    Ok(())
}

/// Handles the main harvest operation
async fn handle_harvest(config: Config) -> anyhow::Result<()> {
    tracing::info!("Starting to harvest primary and secondary school textbook data...");
    tracing::info!(
        "Workers: {}, district delay: {}ms",
        config.crawler.worker_count,
        config.crawler.district_delay_ms
    );

    let reporter = Arc::new(JsonLinesReporter::new(&config.output.error_log_path));

    match harvest(config, reporter).await {
        Ok(summary) => {
            if summary.crawl.records.is_empty() {
                tracing::warn!("No data was harvested");
            } else {
                tracing::info!("Harvest task completed!");
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e).context("Harvest aborted")
        }
    }
}
