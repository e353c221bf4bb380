//! Storage module for crawl results
//!
//! Harvested records live in memory for the duration of a run. The only
//! shared mutable state of a crawl is the [`ResultAggregator`] every city
//! worker appends to.

mod aggregator;

pub use aggregator::ResultAggregator;
