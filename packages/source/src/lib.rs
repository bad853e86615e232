#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Loads emergency call records from local CSV and JSON exports.
//!
//! This is the record source feeding the analytics pipeline. It reads the
//! whole file into memory: the pipeline operates on a complete, in-memory
//! record set.

pub mod csv_file;
pub mod json_file;

use std::path::Path;

use crisis_lens_call_models::CallRecord;

/// Errors that can occur while loading records.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// I/O error (file read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing failed.
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The file contents are not a record export.
    #[error("Invalid record file: {message}")]
    Format {
        /// Description of what went wrong.
        message: String,
    },

    /// The file extension does not name a supported format.
    #[error("Unsupported record file '{path}': expected a .csv or .json file")]
    UnsupportedFormat {
        /// The rejected path.
        path: String,
    },
}

/// Supported record file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFormat {
    /// Comma-separated values with a header row.
    Csv,
    /// JSON array of records, or an object with a `calls` array.
    Json,
}

impl RecordFormat {
    /// Infers the format from a file extension (case-insensitive).
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Loads every record from `path`, choosing the parser by file extension.
///
/// # Errors
///
/// Returns [`SourceError`] if the file cannot be read, has an unsupported
/// extension, or is not a well-formed export. Individual CSV rows that fail
/// to convert are skipped with a warning rather than failing the load.
pub fn load_records(path: &Path) -> Result<Vec<CallRecord>, SourceError> {
    let format = RecordFormat::from_path(path).ok_or_else(|| SourceError::UnsupportedFormat {
        path: path.display().to_string(),
    })?;

    log::info!("Loading call records from {}", path.display());

    let file = std::fs::File::open(path)?;
    let reader = std::io::BufReader::new(file);

    let records = match format {
        RecordFormat::Csv => csv_file::read_records(reader)?,
        RecordFormat::Json => json_file::read_records(reader)?,
    };

    log::info!("Loaded {} call records from {}", records.len(), path.display());

    Ok(records)
}
