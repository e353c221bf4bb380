//! Summary statistics over a processed collection
//!
//! This module computes and displays the end-of-run report: record count,
//! province coverage and the per-grade distribution.

use crate::model::TextbookRecord;
use crate::pipeline::sort::grade_rank;
use std::collections::{HashMap, HashSet};

/// Harvest statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Statistics {
    /// Total number of records
    pub total_records: usize,

    /// Number of distinct provinces
    pub province_count: usize,

    /// Records per grade, most frequent first
    pub grade_counts: Vec<(String, usize)>,
}

/// Computes statistics without modifying the collection
///
/// Grades with equal counts are listed in canonical grade order, unknown
/// grades by name.
pub fn compute_statistics(records: &[TextbookRecord]) -> Statistics {
    let provinces: HashSet<&str> = records.iter().map(|r| r.province.as_str()).collect();

    let mut per_grade: HashMap<&str, usize> = HashMap::new();
    for record in records {
        *per_grade.entry(record.grade.as_str()).or_insert(0) += 1;
    }

    let mut grade_counts: Vec<(String, usize)> = per_grade
        .into_iter()
        .map(|(grade, count)| (grade.to_string(), count))
        .collect();
    grade_counts.sort_by(|a, b| {
        b.1.cmp(&a.1)
            .then_with(|| grade_rank(&a.0).cmp(&grade_rank(&b.0)))
            .then_with(|| a.0.cmp(&b.0))
    });

    Statistics {
        total_records: records.len(),
        province_count: provinces.len(),
        grade_counts,
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// The same figures are also written to the log.
pub fn print_statistics(stats: &Statistics) {
    if stats.total_records == 0 {
        tracing::warn!("No data to report statistics on");
        println!("No data to report statistics on");
        return;
    }

    let rule = "=".repeat(60);
    println!("{}", rule);
    println!("Harvest Statistics");
    println!("{}", rule);

    println!("Total records: {}", stats.total_records);
    tracing::info!("Total records: {}", stats.total_records);

    println!("Provinces covered: {}", stats.province_count);
    tracing::info!("Provinces covered: {}", stats.province_count);

    println!("\nRecords by grade:");
    for (grade, count) in &stats.grade_counts {
        println!("  {}: {}", grade, count);
        tracing::info!("Grade {}: {} records", grade, count);
    }

    println!("{}", rule);
}
