//! Chart aggregations over a filtered record set.
//!
//! Each function is an independent reducer. Chart breakdowns keep
//! first-seen order; the timeline is sorted by month; the age histogram
//! always has the same five bins. The operational breakdowns (township,
//! subtype) are ranked busiest first, with ties in first-seen order.

use std::collections::BTreeMap;

use crisis_lens_analytics_models::{
    AgeBin, AgeBinCount, CategoryCount, SubtypeCount, TimelineBucket,
};
use crisis_lens_call_models::CallRecord;

use crate::counter::FirstSeenCounter;

/// Calls per calendar month (`YYYY-MM`), ascending.
///
/// Only months present in the data appear; gaps are not zero-filled.
/// Records with a malformed timestamp are skipped.
#[must_use]
pub fn aggregate_timeline<'a>(
    records: impl IntoIterator<Item = &'a CallRecord>,
) -> Vec<TimelineBucket> {
    count_periods(records.into_iter().filter_map(CallRecord::month_key))
}

/// Calls per calendar day (`YYYY-MM-DD`), ascending.
///
/// Only days present in the data appear. Records with a malformed
/// timestamp are skipped.
#[must_use]
pub fn aggregate_daily<'a>(
    records: impl IntoIterator<Item = &'a CallRecord>,
) -> Vec<TimelineBucket> {
    count_periods(records.into_iter().filter_map(CallRecord::day_key))
}

fn count_periods(keys: impl Iterator<Item = String>) -> Vec<TimelineBucket> {
    let mut periods: BTreeMap<String, u64> = BTreeMap::new();

    for key in keys {
        *periods.entry(key).or_default() += 1;
    }

    periods
        .into_iter()
        .map(|(period, count)| TimelineBucket { period, count })
        .collect()
}

/// Calls per emergency type, in first-seen order.
#[must_use]
pub fn aggregate_by_type<'a>(
    records: impl IntoIterator<Item = &'a CallRecord>,
) -> Vec<CategoryCount> {
    count_categories(records.into_iter().map(|r| r.emergency_type.as_str()))
}

/// Calls per caller gender, in first-seen order.
#[must_use]
pub fn aggregate_by_gender<'a>(
    records: impl IntoIterator<Item = &'a CallRecord>,
) -> Vec<CategoryCount> {
    count_categories(records.into_iter().map(|r| r.caller_gender.as_str()))
}

/// Calls per township, busiest first.
///
/// Records without a township are counted under the empty key.
#[must_use]
pub fn aggregate_by_township<'a>(
    records: impl IntoIterator<Item = &'a CallRecord>,
) -> Vec<CategoryCount> {
    let mut counts = count_categories(records.into_iter().map(|r| r.township.as_str()));
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// Calls per (type, subtype) pair, busiest first.
#[must_use]
pub fn aggregate_by_subtype<'a>(
    records: impl IntoIterator<Item = &'a CallRecord>,
) -> Vec<SubtypeCount> {
    let mut counts: Vec<SubtypeCount> = records
        .into_iter()
        .map(|r| (r.emergency_type.as_str(), r.emergency_subtype.as_deref()))
        .collect::<FirstSeenCounter<_>>()
        .into_entries()
        .into_iter()
        .map(|((emergency_type, emergency_subtype), count)| SubtypeCount {
            emergency_type: emergency_type.to_string(),
            emergency_subtype: emergency_subtype.map(str::to_string),
            count,
        })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

fn count_categories<'a>(keys: impl Iterator<Item = &'a str>) -> Vec<CategoryCount> {
    keys.collect::<FirstSeenCounter<_>>()
        .into_entries()
        .into_iter()
        .map(|(key, count)| CategoryCount {
            key: key.to_string(),
            count,
        })
        .collect()
}

/// Calls per caller age bin.
///
/// Always returns the five bins of [`AgeBin::ALL`] in order. Records with a
/// missing age or an age outside 18-100 are not counted.
#[must_use]
pub fn aggregate_by_age<'a>(
    records: impl IntoIterator<Item = &'a CallRecord>,
) -> [AgeBinCount; 5] {
    let mut bins = AgeBin::ALL.map(AgeBinCount::empty);

    for bin in records
        .into_iter()
        .filter_map(|r| r.caller_age)
        .filter_map(AgeBin::for_age)
    {
        if let Some(slot) = bins.iter_mut().find(|slot| slot.range == bin) {
            slot.count += 1;
        }
    }

    bins
}
