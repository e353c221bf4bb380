//! Post-crawl processing of the raw aggregate
//!
//! Runs single-threaded once every worker has been joined:
//! 1. dedupe on the record identity key (first occurrence wins)
//! 2. clean out records without province, city or subject
//! 3. sort by province, city and canonical grade
//!
//! Statistics are computed over the result separately.

mod clean;
mod dedupe;
mod sort;
pub mod stats;

pub use clean::{clean, is_complete};
pub use dedupe::dedupe;
pub use sort::{compare_records, grade_rank, sort_records, GRADE_ORDER};
pub use stats::{compute_statistics, print_statistics, Statistics};

use crate::model::TextbookRecord;

/// Runs dedupe, clean and sort over a raw collection
///
/// Accepts plain records as well as `Option` slots (as produced by
/// [`crate::output::load_records`]); absent slots are skipped.
pub fn process<I>(raw: I) -> Vec<TextbookRecord>
where
    I: IntoIterator,
    I::Item: Into<Option<TextbookRecord>>,
{
    let raw: Vec<Option<TextbookRecord>> = raw.into_iter().map(Into::into).collect();
    if raw.is_empty() {
        tracing::warn!("Raw data is empty, nothing to process");
        return Vec::new();
    }

    tracing::info!("Processing data...");
    tracing::info!("Raw records: {}", raw.len());

    let unique = dedupe(raw);
    tracing::info!("Records after dedupe: {}", unique.len());

    let cleaned = clean(unique);
    let sorted = sort_records(cleaned);

    tracing::info!("Processing complete: {} records", sorted.len());
    sorted
}
