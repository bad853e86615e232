//! Single-pass summary statistics over a filtered record set.

use crisis_lens_analytics_models::KpiSummary;
use crisis_lens_call_models::CallRecord;

use crate::counter::FirstSeenCounter;

/// Computes the headline KPIs.
///
/// An empty input yields `total_calls == 0` and `None` for every other
/// field. Records without an age or with a negative age are left out of the
/// average, and records with a malformed timestamp are left out of the peak
/// hour.
#[must_use]
pub fn compute_kpis<'a>(records: impl IntoIterator<Item = &'a CallRecord>) -> KpiSummary {
    let mut total_calls: u64 = 0;
    let mut types = FirstSeenCounter::new();
    let mut hours = FirstSeenCounter::new();
    let mut age_sum: i128 = 0;
    let mut age_count: i128 = 0;

    for record in records {
        total_calls += 1;
        types.add(record.emergency_type.as_str());

        if let Some(age) = record.caller_age
            && age >= 0
        {
            age_sum += i128::from(age);
            age_count += 1;
        }

        if let Some(hour) = record.hour_of_day() {
            hours.add(hour);
        }
    }

    KpiSummary {
        total_calls,
        most_common_type: types.most_common().map(|t| (*t).to_string()),
        avg_age: rounded_mean(age_sum, age_count),
        peak_hour: hours.most_common().copied(),
    }
}

/// Integer mean rounded half away from zero. `None` when `count` is zero.
///
/// Summed in `i128` so that no run of `i64` ages can overflow.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
fn rounded_mean(sum: i128, count: i128) -> Option<i64> {
    (count > 0).then(|| (sum as f64 / count as f64).round() as i64)
}
