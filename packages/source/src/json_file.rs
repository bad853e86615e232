//! JSON record reader.
//!
//! Accepts a bare array of records (the `/calls/latest` response) or an
//! object wrapping the array under one of [`ENVELOPE_KEYS`]. The paginated
//! `/calls` response uses `results`.

use std::io::Read;

use crisis_lens_call_models::CallRecord;

use crate::SourceError;

/// Keys under which a wrapped response may carry its record array.
pub const ENVELOPE_KEYS: &[&str] = &["results", "calls"];

const SHAPE_ERROR: &str = "expected a JSON array or an object with a 'results' or 'calls' array";

/// Reads all records from a JSON document.
///
/// # Errors
///
/// Returns [`SourceError`] if the document is not valid JSON or holds no
/// record array. Array elements that do not convert to a record are
/// skipped with a warning.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<CallRecord>, SourceError> {
    let document: serde_json::Value = serde_json::from_reader(reader)?;

    let items = match document {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(mut obj) => ENVELOPE_KEYS
            .iter()
            .find_map(|key| match obj.remove(*key) {
                Some(serde_json::Value::Array(items)) => Some(items),
                _ => None,
            })
            .ok_or_else(shape_error)?,
        _ => return Err(shape_error()),
    };

    let total = items.len();
    let records: Vec<CallRecord> = items
        .into_iter()
        .enumerate()
        .filter_map(|(i, item)| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(e) => {
                log::warn!("Skipping JSON record {i}: {e}");
                None
            }
        })
        .collect();

    if records.len() < total {
        log::warn!("Skipped {} malformed JSON records", total - records.len());
    }

    Ok(records)
}

fn shape_error() -> SourceError {
    SourceError::Format {
        message: SHAPE_ERROR.to_owned(),
    }
}
