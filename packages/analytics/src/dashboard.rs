//! Composes the full dashboard view for one filter state.

use std::collections::BTreeSet;

use crisis_lens_analytics_models::{CallStats, DashboardView, FilterOptions, HeatmapPoint};
use crisis_lens_call_models::{CallRecord, FilterCriteria};

use crate::aggregate::{
    aggregate_by_age, aggregate_by_gender, aggregate_by_subtype, aggregate_by_township,
    aggregate_by_type, aggregate_daily, aggregate_timeline,
};
use crate::anomaly::{detect_timeline_anomalies, summarize_anomalies};
use crate::counter::FirstSeenCounter;
use crate::filter::filter_refs;
use crate::kpi::compute_kpis;

/// Default number of heatmap points handed to the map layer.
pub const DEFAULT_HEATMAP_LIMIT: usize = 200;

/// Knobs for [`build_dashboard`] that are not part of the filter state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardOptions {
    /// Maximum number of heatmap points.
    pub heatmap_limit: usize,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            heatmap_limit: DEFAULT_HEATMAP_LIMIT,
        }
    }
}

/// Runs the whole pipeline: filter, KPIs, aggregations, anomaly detection.
///
/// Filter options are drawn from the unfiltered `records` so the panel
/// keeps offering every choice.
#[must_use]
pub fn build_dashboard(
    records: &[CallRecord],
    criteria: &FilterCriteria,
    options: DashboardOptions,
) -> DashboardView {
    let filtered = filter_refs(records, criteria);
    log::debug!(
        "build_dashboard: {} of {} records match",
        filtered.len(),
        records.len()
    );

    let timeline = detect_timeline_anomalies(&aggregate_timeline(filtered.iter().copied()));
    let anomalies = summarize_anomalies(&timeline);
    if anomalies.anomaly_count > 0 {
        log::debug!(
            "build_dashboard: {} of {} months flagged",
            anomalies.anomaly_count,
            anomalies.total_data_points
        );
    }

    DashboardView {
        total_records: records.len() as u64,
        kpis: compute_kpis(filtered.iter().copied()),
        timeline,
        by_type: aggregate_by_type(filtered.iter().copied()),
        by_age: aggregate_by_age(filtered.iter().copied()),
        by_gender: aggregate_by_gender(filtered.iter().copied()),
        anomalies,
        heatmap: heatmap_points(filtered.iter().copied(), options.heatmap_limit),
        filter_options: filter_options(records),
    }
}

/// Township, daily and subtype breakdowns of the records matching
/// `criteria`.
#[must_use]
pub fn build_stats(records: &[CallRecord], criteria: &FilterCriteria) -> CallStats {
    let filtered = filter_refs(records, criteria);
    log::debug!(
        "build_stats: {} of {} records match",
        filtered.len(),
        records.len()
    );

    CallStats {
        by_township: aggregate_by_township(filtered.iter().copied()),
        daily: aggregate_daily(filtered.iter().copied()),
        by_subtype: aggregate_by_subtype(filtered.iter().copied()),
    }
}

/// One unit-weight point per record with coordinates, up to `limit`.
#[must_use]
pub fn heatmap_points<'a>(
    records: impl IntoIterator<Item = &'a CallRecord>,
    limit: usize,
) -> Vec<HeatmapPoint> {
    records
        .into_iter()
        .filter_map(CallRecord::coordinates)
        .take(limit)
        .map(|(lat, lng)| HeatmapPoint { lat, lng, value: 1 })
        .collect()
}

/// Distinct filter choices present in `records`.
///
/// Types keep first-seen order; townships and postal codes are sorted.
/// Empty values are not offered.
#[must_use]
pub fn filter_options(records: &[CallRecord]) -> FilterOptions {
    let types = records
        .iter()
        .map(|r| r.emergency_type.as_str())
        .filter(|t| !t.is_empty())
        .collect::<FirstSeenCounter<_>>();

    FilterOptions {
        types: types
            .into_entries()
            .into_iter()
            .map(|(t, _)| t.to_string())
            .collect(),
        townships: distinct_sorted(records.iter().map(|r| r.township.as_str())),
        zipcodes: distinct_sorted(records.iter().map(|r| r.zipcode.as_str())),
    }
}

fn distinct_sorted<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .filter(|v| !v.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use crisis_lens_analytics_models::AgeBin;
    use crisis_lens_call_models::DateRange;

    use super::*;
    use crate::test_support::{At as _, call};

    fn scenario() -> Vec<CallRecord> {
        vec![
            call("1", "2015-01-03 05:10:00", "Fire", 30, "Male").at("ABINGTON", "19001"),
            call("2", "2015-01-20 05:45:00", "EMS", 40, "Female").at("CHELTENHAM", "19012"),
            call("3", "2015-02-11 14:00:00", "EMS", 50, "Female").at("ABINGTON", "19001"),
        ]
    }

    #[test]
    fn end_to_end_scenario() {
        let records = scenario();
        let view = build_dashboard(&records, &FilterCriteria::default(), DashboardOptions::default());

        assert_eq!(view.total_records, 3);
        assert_eq!(view.kpis.total_calls, 3);
        assert_eq!(view.kpis.most_common_type.as_deref(), Some("EMS"));
        assert_eq!(view.kpis.avg_age, Some(40));
        assert_eq!(view.kpis.peak_hour_label(), "05:00");

        let timeline: Vec<(&str, u64)> = view
            .timeline
            .iter()
            .map(|b| (b.period.as_str(), b.count))
            .collect();
        assert_eq!(timeline, [("2015-01", 2), ("2015-02", 1)]);
        assert!(view.timeline.iter().all(|b| !b.is_anomaly));
        assert_eq!(view.anomalies.anomaly_count, 0);
        assert_eq!(view.anomalies.total_data_points, 2);

        let types: Vec<(&str, u64)> = view.by_type.iter().map(|c| (c.key.as_str(), c.count)).collect();
        assert_eq!(types, [("Fire", 1), ("EMS", 2)]);

        let ages: Vec<(AgeBin, u64)> = view.by_age.iter().map(|b| (b.range, b.count)).collect();
        assert_eq!(
            ages,
            [
                (AgeBin::YoungAdult, 0),
                (AgeBin::Adult, 1),
                (AgeBin::MiddleAged, 1),
                (AgeBin::Mature, 1),
                (AgeBin::Senior, 0),
            ]
        );
    }

    #[test]
    fn empty_filter_result_is_well_formed() {
        let records = scenario();
        let criteria = FilterCriteria::default().with_types(["Hazmat"]);
        let view = build_dashboard(&records, &criteria, DashboardOptions::default());

        assert_eq!(view.kpis.total_calls, 0);
        assert_eq!(view.kpis.most_common_type_label(), "—");
        assert!(view.timeline.is_empty());
        assert!(view.by_type.is_empty());
        assert!(view.by_gender.is_empty());
        assert!(view.by_age.iter().all(|b| b.count == 0));
        assert!(view.heatmap.is_empty());
        assert_eq!(view.anomalies.percentage, 0.0);
        assert_eq!(view.filter_options.types, ["Fire", "EMS"]);
    }

    #[test]
    fn identical_inputs_serialize_identically() {
        let records = scenario();
        let criteria = FilterCriteria::for_range(DateRange::parse("2015-01-01", "2015-01-31").unwrap());
        let a = serde_json::to_string(&build_dashboard(&records, &criteria, DashboardOptions::default()))
            .unwrap();
        let b = serde_json::to_string(&build_dashboard(&records, &criteria, DashboardOptions::default()))
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn heatmap_respects_limit_and_skips_missing_coordinates() {
        let mut records = scenario();
        records[1].latitude = None;
        let points = heatmap_points(&records, 200);
        assert_eq!(points.len(), 2);
        assert!(points.iter().all(|p| p.value == 1));
        assert_eq!(heatmap_points(&records, 1).len(), 1);
    }

    #[test]
    fn filter_options_come_from_unfiltered_records() {
        let mut records = scenario();
        records.push(call("4", "2016-06-01 09:00:00", "Traffic", 20, "Male").at("ABINGTON", "19001"));
        records.push(call("5", "2015-06-01 09:00:00", "EMS", 20, "Male").at("", ""));

        let criteria = FilterCriteria::default().with_types(["Fire"]);
        let view = build_dashboard(&records, &criteria, DashboardOptions::default());

        assert_eq!(view.kpis.total_calls, 1);
        assert_eq!(view.filter_options.types, ["Fire", "EMS", "Traffic"]);
        assert_eq!(view.filter_options.townships, ["ABINGTON", "CHELTENHAM"]);
        assert_eq!(view.filter_options.zipcodes, ["19001", "19012"]);
    }

    #[test]
    fn stats_cover_only_matching_records() {
        let mut records = scenario();
        records.push(call("4", "2016-03-01 08:00:00", "Traffic", 25, "Male").at("LANSDALE", "19446"));

        let stats = build_stats(&records, &FilterCriteria::default());
        let townships: Vec<(&str, u64)> = stats
            .by_township
            .iter()
            .map(|c| (c.key.as_str(), c.count))
            .collect();
        assert_eq!(townships, [("ABINGTON", 2), ("CHELTENHAM", 1)]);

        let days: Vec<&str> = stats.daily.iter().map(|b| b.period.as_str()).collect();
        assert_eq!(days, ["2015-01-03", "2015-01-20", "2015-02-11"]);

        assert_eq!(stats.by_subtype.len(), 2);
        assert_eq!(stats.by_subtype[0].emergency_type, "EMS");
        assert_eq!(stats.by_subtype[0].count, 2);
    }
}
