use serde::Deserialize;

/// Main configuration structure for Textbook-Harvest
///
/// Every section falls back to its default, so an empty file (or no file at
/// all) yields a configuration that targets the public catalog site.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Catalog page listing every province and its cities
    #[serde(rename = "root-url")]
    pub root_url: String,

    /// Prefix joined with the relative hrefs of city and district links
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Number of cities crawled in parallel
    #[serde(rename = "worker-count")]
    pub worker_count: u32,

    /// Pause between two district fetches of the same city (milliseconds)
    #[serde(rename = "district-delay-ms")]
    pub district_delay_ms: u64,

    /// Time granted to outstanding workers on shutdown before they are aborted
    #[serde(rename = "shutdown-grace-secs")]
    pub shutdown_grace_secs: u64,

    /// Time granted to aborted workers to unwind
    #[serde(rename = "shutdown-force-secs")]
    pub shutdown_force_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            root_url: "http://www.dzkbw.com/city/".to_string(),
            base_url: "http://www.dzkbw.com".to_string(),
            worker_count: 10,
            district_delay_ms: 100,
            shutdown_grace_secs: 60,
            shutdown_force_secs: 10,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Value sent in the User-Agent header of every request
    pub value: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            value: "Mozilla/5.0 (Windows NT 10.0; Win64; x64)".to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// CSV file receiving the raw aggregate right after the crawl
    #[serde(rename = "raw-csv-path")]
    pub raw_csv_path: String,

    /// CSV file receiving the deduplicated, cleaned and sorted collection
    #[serde(rename = "processed-csv-path")]
    pub processed_csv_path: Option<String>,

    /// JSON-lines file every reported error is appended to
    #[serde(rename = "error-log-path")]
    pub error_log_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            raw_csv_path: "全国中小学教材版本.csv".to_string(),
            processed_csv_path: None,
            error_log_path: "error_logs.txt".to_string(),
        }
    }
}
