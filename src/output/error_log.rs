//! Structured error reporting
//!
//! Every error the crawl contains (a failed city, a failed district, a failed
//! export) is handed to an [`ErrorReporter`]. The production reporter appends
//! one JSON object per error to a side file in addition to the tracing log.

use crate::HarvestError;
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Receives every error that is handled without aborting the run
pub trait ErrorReporter: Send + Sync {
    /// Records `error` with a short description of what was being done
    ///
    /// Implementations must not fail; problems writing the report are
    /// printed and dropped.
    fn report(&self, message: &str, error: &HarvestError);
}

/// One line of the error log
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEntry {
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    pub message: String,
    /// Error kind, see [`HarvestError::kind`]
    pub exception: String,
    pub error_message: String,
    /// The error followed by its chain of sources, one per line
    pub stack_trace: String,
}

impl ErrorEntry {
    pub fn new(message: &str, error: &HarvestError) -> Self {
        Self {
            timestamp: chrono::Utc::now().timestamp_millis(),
            message: message.to_string(),
            exception: error.kind().to_string(),
            error_message: error.to_string(),
            stack_trace: render_source_chain(error),
        }
    }
}

fn render_source_chain(error: &dyn std::error::Error) -> String {
    let mut lines = vec![error.to_string()];
    let mut source = error.source();
    while let Some(cause) = source {
        lines.push(format!("Caused by: {}", cause));
        source = cause.source();
    }
    lines.join("\n")
}

/// Appends each report as a JSON line to a file
#[derive(Debug)]
pub struct JsonLinesReporter {
    path: PathBuf,
    // Serializes appends so concurrent reports never interleave within a line
    write_lock: Mutex<()>,
}

impl JsonLinesReporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, line: &str) -> std::io::Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", line)
    }
}

impl ErrorReporter for JsonLinesReporter {
    fn report(&self, message: &str, error: &HarvestError) {
        let entry = ErrorEntry::new(message, error);

        let json = match serde_json::to_string(&entry) {
            Ok(json) => json,
            Err(e) => {
                eprintln!("Failed to serialize error report: {}", e);
                return;
            }
        };

        tracing::error!("{}", json);

        if let Err(e) = self.append(&json) {
            eprintln!(
                "Failed to write error log {}: {}",
                self.path.display(),
                e
            );
        }
    }
}

/// Keeps reports in memory
///
/// Useful where no side file is wanted, and for inspecting what a run reported.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    entries: Mutex<Vec<ErrorEntry>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<ErrorEntry> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl ErrorReporter for MemoryReporter {
    fn report(&self, message: &str, error: &HarvestError) {
        tracing::error!("{}: {}", message, error);
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(ErrorEntry::new(message, error));
    }
}
