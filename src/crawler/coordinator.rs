//! Crawler coordinator - main crawl orchestration logic
//!
//! This module drives one crawl run:
//! - Fetching the root catalog page and extracting the city list
//! - Dispatching one worker per city onto a bounded pool
//! - Walking each city's districts sequentially with a politeness delay
//! - Joining all workers and exporting the raw aggregate
//!
//! Failures are contained at the smallest scope possible: a bad entry skips
//! that entry, a bad district skips that district, a bad city skips that
//! city. Only an unreachable root page aborts the run.

use crate::config::Config;
use crate::crawler::extractor::{extract_cities, extract_districts, extract_leaf_records};
use crate::crawler::fetcher::{build_http_client, fetch_page, FetchedPage};
use crate::crawler::pool::{ShutdownOutcome, WorkerPool};
use crate::model::{CityDescriptor, DistrictDescriptor, TextbookRecord};
use crate::output::{export_records, ErrorReporter};
use crate::state::CrawlPhase;
use crate::storage::ResultAggregator;
use crate::HarvestError;
use reqwest::Client;
use scraper::Html;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// What a single city worker achieved
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CityOutcome {
    /// City name
    pub city: String,

    /// False if the city page itself could not be fetched
    pub fetched: bool,

    /// Districts whose page was fetched and extracted
    pub districts_visited: usize,

    /// Districts whose page could not be fetched
    pub districts_failed: usize,

    /// Records appended to the aggregator
    pub records: usize,
}

/// Result of a completed crawl run
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    pub cities_found: usize,
    pub cities_failed: usize,
    pub districts_visited: usize,
    pub districts_failed: usize,

    /// Records appended by all city workers
    pub records_collected: usize,

    /// Raw aggregate in arrival order
    pub records: Vec<TextbookRecord>,

    pub elapsed: Duration,
}

/// Everything a city worker needs, shared between workers
struct WorkerContext {
    client: Client,
    aggregator: Arc<ResultAggregator>,
    reporter: Arc<dyn ErrorReporter>,
    base_url: String,
    district_delay: Duration,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    client: Client,
    aggregator: Arc<ResultAggregator>,
    reporter: Arc<dyn ErrorReporter>,
    pool: WorkerPool<CityOutcome>,
    phase: CrawlPhase,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// The worker pool is created here and lives until [`Coordinator::shutdown`].
    ///
    /// # Arguments
    ///
    /// * `config` - The harvest configuration
    /// * `reporter` - Receives every error that is contained during the run
    pub fn new(config: Config, reporter: Arc<dyn ErrorReporter>) -> Result<Self, HarvestError> {
        let client = build_http_client(&config.user_agent).map_err(HarvestError::Client)?;
        let pool = WorkerPool::new(config.crawler.worker_count as usize);

        Ok(Self {
            config: Arc::new(config),
            client,
            aggregator: Arc::new(ResultAggregator::new()),
            reporter,
            pool,
            phase: CrawlPhase::Idle,
        })
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    fn advance(&mut self, next: CrawlPhase) -> Result<(), HarvestError> {
        if !self.phase.can_transition_to(next) {
            return Err(HarvestError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }
        tracing::debug!("Crawl phase {} -> {}", self.phase, next);
        self.phase = next;
        Ok(())
    }

    /// Runs the crawl to completion
    ///
    /// A coordinator runs once; calling `run` again fails with
    /// [`HarvestError::InvalidTransition`].
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - Crawl completed, possibly with contained failures
    /// * `Err(HarvestError::RootUnreachable)` - No city could be discovered
    pub async fn run(&mut self) -> Result<CrawlReport, HarvestError> {
        self.advance(CrawlPhase::FetchingRoot)?;
        let start = Instant::now();

        let root_url = self.config.crawler.root_url.clone();
        tracing::info!("Fetching city list from {}", root_url);

        let root_page = match fetch_page(&self.client, &root_url).await {
            Ok(page) => page,
            Err(source) => {
                self.advance(CrawlPhase::Failed)?;
                let error = HarvestError::RootUnreachable {
                    url: root_url,
                    source,
                };
                self.reporter.report("Crawl aborted: root page unreachable", &error);
                return Err(error);
            }
        };

        let cities = cities_from_page(&root_page, &self.config.crawler.base_url);
        tracing::info!("Found {} cities", cities.len());

        self.advance(CrawlPhase::Dispatching)?;
        let context = Arc::new(WorkerContext {
            client: self.client.clone(),
            aggregator: Arc::clone(&self.aggregator),
            reporter: Arc::clone(&self.reporter),
            base_url: self.config.crawler.base_url.clone(),
            district_delay: Duration::from_millis(self.config.crawler.district_delay_ms),
        });
        let cities_found = cities.len();
        for city in cities {
            self.pool.submit(process_city(Arc::clone(&context), city));
        }

        self.advance(CrawlPhase::AwaitingWorkers)?;
        let mut report = CrawlReport {
            cities_found,
            ..CrawlReport::default()
        };
        for result in self.pool.join_all().await {
            match result {
                Ok(outcome) => {
                    if !outcome.fetched {
                        report.cities_failed += 1;
                    }
                    report.districts_visited += outcome.districts_visited;
                    report.districts_failed += outcome.districts_failed;
                    report.records_collected += outcome.records;
                }
                Err(e) => {
                    report.cities_failed += 1;
                    self.reporter.report(
                        "City worker terminated abnormally",
                        &HarvestError::Worker(e.to_string()),
                    );
                }
            }
        }

        self.advance(CrawlPhase::Exporting)?;
        report.records = self.aggregator.snapshot();
        let raw_path = Path::new(&self.config.output.raw_csv_path);
        if let Err(e) = export_records(&report.records, raw_path) {
            self.reporter
                .report("Failed to save raw CSV file", &HarvestError::Export(e));
        }

        self.advance(CrawlPhase::Done)?;
        report.elapsed = start.elapsed();

        tracing::info!(
            "Crawl completed: {} records from {} cities ({} failed), {} districts ({} failed) in {:?}",
            report.records_collected,
            report.cities_found,
            report.cities_failed,
            report.districts_visited,
            report.districts_failed,
            report.elapsed
        );

        Ok(report)
    }

    /// Shuts down the worker pool, consuming the coordinator
    pub async fn shutdown(self) -> ShutdownOutcome {
        let grace = Duration::from_secs(self.config.crawler.shutdown_grace_secs);
        let force = Duration::from_secs(self.config.crawler.shutdown_force_secs);
        let outcome = self.pool.shutdown(grace, force).await;
        match outcome {
            ShutdownOutcome::Graceful => tracing::info!("Worker pool shut down"),
            other => tracing::warn!("Worker pool shut down uncleanly: {:?}", other),
        }
        outcome
    }
}

/// Processes one city subtree
///
/// Districts are visited one after another, pausing between them. A failed
/// district is reported and skipped.
async fn process_city(context: Arc<WorkerContext>, city: CityDescriptor) -> CityOutcome {
    tracing::info!("Processing city: {}-{}", city.province, city.name);

    let mut outcome = CityOutcome {
        city: city.name.clone(),
        ..CityOutcome::default()
    };

    let city_page = match fetch_page(&context.client, &city.url).await {
        Ok(page) => page,
        Err(e) => {
            context.reporter.report(
                &format!("Failed to process city: {}", city.name),
                &HarvestError::Fetch(e),
            );
            return outcome;
        }
    };
    outcome.fetched = true;

    let districts = districts_from_page(&city_page, &context.base_url);
    tracing::debug!("{} has {} districts", city.name, districts.len());

    for (index, district) in districts.iter().enumerate() {
        if index > 0 {
            tokio::time::sleep(context.district_delay).await;
        }

        match fetch_page(&context.client, &district.url).await {
            Ok(page) => {
                let batch = records_from_page(&page, &city, district);
                outcome.records += batch.len();
                outcome.districts_visited += 1;
                context.aggregator.append_batch(batch);
            }
            Err(e) => {
                outcome.districts_failed += 1;
                context.reporter.report(
                    &format!("Failed to process district: {}", district.name),
                    &HarvestError::Fetch(e),
                );
            }
        }
    }

    outcome
}

// The parsed document is not Send, so parsing and extraction stay in these
// synchronous helpers and never live across an await point.

fn cities_from_page(page: &FetchedPage, base_url: &str) -> Vec<CityDescriptor> {
    let document = Html::parse_document(&page.body);
    extract_cities(&document, base_url)
}

fn districts_from_page(page: &FetchedPage, base_url: &str) -> Vec<DistrictDescriptor> {
    let document = Html::parse_document(&page.body);
    extract_districts(&document, base_url)
}

fn records_from_page(
    page: &FetchedPage,
    city: &CityDescriptor,
    district: &DistrictDescriptor,
) -> Vec<TextbookRecord> {
    let document = Html::parse_document(&page.body);
    extract_leaf_records(&document, city, district)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(record) => Some(record),
            Err(reason) => {
                tracing::debug!("Skipped entry on {}: {}", page.url, reason);
                None
            }
        })
        .collect()
}
