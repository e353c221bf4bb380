//! Textbook-Harvest: a regional textbook catalog harvester
//!
//! This crate crawls a province → city → district catalog site with bounded
//! concurrency, aggregates the textbook entries found on every district page,
//! and turns the raw aggregate into a deduplicated, cleaned and sorted export
//! with summary statistics.

pub mod config;
pub mod crawler;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for Textbook-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Root catalog page unreachable: {url}")]
    RootUnreachable {
        url: String,
        #[source]
        source: FetchError,
    },

    #[error("Export error: {0}")]
    Export(#[from] output::ExportError),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::CrawlPhase,
        to: state::CrawlPhase,
    },

    #[error("City worker stopped abnormally: {0}")]
    Worker(String),

    #[error("HTTP client error: {0}")]
    Client(#[source] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl HarvestError {
    /// Stable name of the error variant, recorded in the error log
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "ConfigError",
            Self::Fetch(e) => e.kind(),
            Self::RootUnreachable { .. } => "RootUnreachable",
            Self::Export(_) => "ExportError",
            Self::InvalidTransition { .. } => "InvalidTransition",
            Self::Worker(_) => "WorkerError",
            Self::Client(_) => "ClientError",
            Self::Io(_) => "IoError",
        }
    }
}

/// Transport-level failure for a single URL
///
/// A fetch error only abandons the subtree rooted at the failing page.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error for {url}: {source}")]
    Transport { url: String, source: reqwest::Error },

    #[error("Unexpected HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Failed to decode body of {url}: {source}")]
    Decode { url: String, source: reqwest::Error },
}

impl FetchError {
    /// The URL that failed
    pub fn url(&self) -> &str {
        match self {
            Self::Transport { url, .. } | Self::Status { url, .. } | Self::Decode { url, .. } => {
                url
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "FetchError::Transport",
            Self::Status { .. } => "FetchError::Status",
            Self::Decode { .. } => "FetchError::Decode",
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Textbook-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use model::{CityDescriptor, DistrictDescriptor, TextbookRecord};
pub use state::CrawlPhase;
pub use storage::ResultAggregator;
