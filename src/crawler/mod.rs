//! Crawler module for catalog fetching and extraction
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with a fixed user agent
//! - Extraction of cities, districts and textbook entries from catalog pages
//! - A bounded worker pool for parallel city traversal
//! - Overall crawl coordination

mod coordinator;
mod extractor;
mod fetcher;
mod pool;

pub use coordinator::{CityOutcome, Coordinator, CrawlReport};
pub use extractor::{
    extract_cities, extract_districts, extract_leaf_records, SkipReason, UNKNOWN_VERSION,
};
pub use fetcher::{build_http_client, fetch_page, FetchedPage};
pub use pool::{ShutdownOutcome, WorkerPool};

use crate::config::Config;
use crate::model::TextbookRecord;
use crate::output::{export_records, ErrorReporter};
use crate::pipeline::{self, Statistics};
use crate::HarvestError;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// Outcome of a full harvest run
#[derive(Debug, Clone)]
pub struct HarvestSummary {
    /// Counters and raw aggregate of the crawl
    pub crawl: CrawlReport,

    /// Deduplicated, cleaned and sorted records
    pub processed: Vec<TextbookRecord>,

    pub statistics: Statistics,

    /// How the worker pool ended
    pub shutdown: ShutdownOutcome,
}

/// Runs a complete harvest
///
/// This is the main entry point. It will:
/// 1. Crawl the catalog and export the raw aggregate
/// 2. Process the aggregate (dedupe, clean, sort)
/// 3. Export the processed collection if a path is configured
/// 4. Print statistics
///
/// The worker pool is shut down once the crawl returns, whatever the outcome.
///
/// # Returns
///
/// * `Ok(HarvestSummary)` - Harvest completed, possibly with contained failures
/// * `Err(HarvestError)` - The root page was unreachable or setup failed
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use textbook_harvest::config::Config;
/// use textbook_harvest::crawler::harvest;
/// use textbook_harvest::output::JsonLinesReporter;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Config::default();
/// let reporter = Arc::new(JsonLinesReporter::new(&config.output.error_log_path));
/// let summary = harvest(config, reporter).await?;
/// println!("{} records", summary.processed.len());
/// # Ok(())
/// # }
/// ```
pub async fn harvest(
    config: Config,
    reporter: Arc<dyn ErrorReporter>,
) -> Result<HarvestSummary, HarvestError> {
    let start = Instant::now();
    tracing::info!("Starting textbook harvest from {}", config.crawler.root_url);

    let processed_path = config.output.processed_csv_path.clone();
    let mut coordinator = Coordinator::new(config, Arc::clone(&reporter))?;

    let crawl = coordinator.run().await;
    let shutdown = coordinator.shutdown().await;

    let result = crawl.map(|crawl| {
        process_crawl(crawl, shutdown, processed_path.as_deref(), reporter.as_ref())
    });

    let elapsed = start.elapsed().as_secs();
    tracing::info!("Total time: {} min {} s", elapsed / 60, elapsed % 60);

    result
}

fn process_crawl(
    crawl: CrawlReport,
    shutdown: ShutdownOutcome,
    processed_path: Option<&str>,
    reporter: &dyn ErrorReporter,
) -> HarvestSummary {
    if crawl.records.is_empty() {
        tracing::warn!("No records were harvested");
    }

    let processed = pipeline::process(crawl.records.iter().cloned());
    let statistics = pipeline::compute_statistics(&processed);

    if let Some(path) = processed_path {
        if let Err(e) = export_records(&processed, Path::new(path)) {
            reporter.report("Failed to save processed CSV file", &HarvestError::Export(e));
        }
    }

    pipeline::print_statistics(&statistics);
    tracing::info!("Harvest finished");

    HarvestSummary {
        crawl,
        processed,
        statistics,
        shutdown,
    }
}
