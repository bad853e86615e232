//! Spike detection over the monthly call-volume series.
//!
//! Statistics are computed over the whole series (population mean and
//! standard deviation, not a rolling window). A bucket is anomalous when its
//! z-score exceeds [`ANOMALY_Z_THRESHOLD`] in absolute value.

use crisis_lens_analytics_models::{AnomalySummary, EnrichedBucket, TimelineBucket};

/// Absolute z-score above which a bucket is flagged.
pub const ANOMALY_Z_THRESHOLD: f64 = 2.0;

/// Annotates every bucket with the series mean, population standard
/// deviation, its z-score and its anomaly flag.
///
/// Output order matches input order. When every bucket has the same count
/// the standard deviation is zero; all z-scores are then `0.0` and nothing
/// is flagged.
#[must_use]
pub fn detect_timeline_anomalies(series: &[TimelineBucket]) -> Vec<EnrichedBucket> {
    let Some((mean, stddev)) = population_stats(series) else {
        return Vec::new();
    };

    series
        .iter()
        .map(|bucket| {
            let z_score = if stddev == 0.0 {
                0.0
            } else {
                (as_f64(bucket.count) - mean) / stddev
            };

            EnrichedBucket {
                period: bucket.period.clone(),
                count: bucket.count,
                mean,
                stddev,
                z_score,
                is_anomaly: z_score.abs() > ANOMALY_Z_THRESHOLD,
            }
        })
        .collect()
}

/// Counts the flagged buckets for the alert banner.
///
/// `percentage` is `0.0` for an empty series.
#[must_use]
pub fn summarize_anomalies(series: &[EnrichedBucket]) -> AnomalySummary {
    let anomaly_count = series.iter().filter(|b| b.is_anomaly).count() as u64;
    let total_data_points = series.len() as u64;

    let percentage = if total_data_points == 0 {
        0.0
    } else {
        as_f64(anomaly_count) / as_f64(total_data_points) * 100.0
    };

    AnomalySummary {
        anomaly_count,
        total_data_points,
        percentage,
    }
}

/// Population mean and standard deviation of the bucket counts.
fn population_stats(series: &[TimelineBucket]) -> Option<(f64, f64)> {
    if series.is_empty() {
        return None;
    }

    let n = as_f64(series.len() as u64);
    let mean = series.iter().map(|b| as_f64(b.count)).sum::<f64>() / n;
    let variance = series
        .iter()
        .map(|b| {
            let diff = as_f64(b.count) - mean;
            diff * diff
        })
        .sum::<f64>()
        / n;

    Some((mean, variance.sqrt()))
}

#[allow(clippy::cast_precision_loss)]
const fn as_f64(value: u64) -> f64 {
    value as f64
}
