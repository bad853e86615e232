//! Filter engine: reduces the full record set to the records matching the
//! current [`FilterCriteria`].

use crisis_lens_call_models::{CallRecord, FilterCriteria};

/// Returns `true` if `record` satisfies every clause of `criteria`.
///
/// A record whose timestamp cannot be parsed never matches.
#[must_use]
pub fn matches(record: &CallRecord, criteria: &FilterCriteria) -> bool {
    date_match(record, criteria)
        && type_match(record, criteria)
        && township_match(record, criteria)
        && zip_match(record, criteria)
}

fn date_match(record: &CallRecord, criteria: &FilterCriteria) -> bool {
    record
        .occurred_at()
        .is_some_and(|t| criteria.date_range.contains(&t))
}

fn type_match(record: &CallRecord, criteria: &FilterCriteria) -> bool {
    criteria.types.is_empty() || criteria.types.contains(&record.emergency_type)
}

fn township_match(record: &CallRecord, criteria: &FilterCriteria) -> bool {
    criteria.township.is_empty() || record.township == criteria.township
}

fn zip_match(record: &CallRecord, criteria: &FilterCriteria) -> bool {
    criteria.zipcode.is_empty() || record.zipcode == criteria.zipcode
}

/// Borrows the matching records, in input order.
#[must_use]
pub fn filter_refs<'a>(records: &'a [CallRecord], criteria: &FilterCriteria) -> Vec<&'a CallRecord> {
    records.iter().filter(|r| matches(r, criteria)).collect()
}

/// Clones the matching records, in input order.
#[must_use]
pub fn filter_records(records: &[CallRecord], criteria: &FilterCriteria) -> Vec<CallRecord> {
    records
        .iter()
        .filter(|r| matches(r, criteria))
        .cloned()
        .collect()
}
