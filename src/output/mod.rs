//! Output module for exports and error reports
//!
//! This module handles:
//! - Writing harvested records to CSV (and reading exports back)
//! - Reporting contained errors to a structured JSON-lines log

mod csv_export;
mod error_log;

pub use csv_export::{export_records, load_records, ExportError, CSV_HEADER};
pub use error_log::{ErrorEntry, ErrorReporter, JsonLinesReporter, MemoryReporter};
