//! CSV export of textbook records
//!
//! The exported file is UTF-8, comma-delimited, with a fixed seven-column
//! header. Exported files can be read back for offline processing.

use crate::model::TextbookRecord;
use std::fs::File;
use std::path::Path;
use thiserror::Error;

/// Header row of every exported file
pub const CSV_HEADER: [&str; 7] = ["省", "市", "区/县", "年级", "科目", "版本", "课本链接"];

/// Errors that can occur while writing or reading an export
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error on {path}: {source}")]
    Csv { path: String, source: csv::Error },
}

impl ExportError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }

    fn csv(path: &Path, source: csv::Error) -> Self {
        Self::Csv {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Writes the header followed by one row per record
///
/// The file is created (or truncated) at `path` and closed before returning,
/// on success as well as on error.
///
/// # Returns
///
/// * `Ok(usize)` - Number of data rows written
/// * `Err(ExportError)` - The file could not be created or written
pub fn export_records(records: &[TextbookRecord], path: &Path) -> Result<usize, ExportError> {
    let file = File::create(path).map_err(|e| ExportError::io(path, e))?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);

    writer
        .write_record(CSV_HEADER)
        .map_err(|e| ExportError::csv(path, e))?;

    for record in records {
        writer
            .serialize(record)
            .map_err(|e| ExportError::csv(path, e))?;
    }

    writer.flush().map_err(|e| ExportError::io(path, e))?;

    tracing::info!("Saved {} records to: {}", records.len(), path.display());
    Ok(records.len())
}

/// Reads an exported file back
///
/// Rows that do not match the header layout are returned as `None` so the
/// caller can skip them without losing the rest of the file.
pub fn load_records(path: &Path) -> Result<Vec<Option<TextbookRecord>>, ExportError> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| ExportError::csv(path, e))?;

    let rows = reader
        .deserialize::<TextbookRecord>()
        .enumerate()
        .map(|(index, row)| match row {
            Ok(record) => Some(record),
            Err(e) => {
                // +2: one for the header, one for 1-based line numbers
                tracing::warn!("Skipping unreadable row {} of {}: {}", index + 2, path.display(), e);
                None
            }
        })
        .collect();

    Ok(rows)
}
