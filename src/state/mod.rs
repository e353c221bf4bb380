//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlPhase`: Tracks where the coordinator is in a crawl run (root fetch, dispatch, join, export)

mod crawl_phase;

pub use crawl_phase::CrawlPhase;
