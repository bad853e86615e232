#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Dashboard view types produced by the call analytics pipeline.
//!
//! Every type here is chart-ready: the presentation layer renders these
//! values as-is and performs no aggregation of its own. Types are
//! serialized as `camelCase` JSON.

use serde::{Deserialize, Serialize, Serializer};
use strum_macros::{AsRefStr, Display, EnumString};

/// Placeholder shown for a KPI that is undefined because no records
/// matched.
pub const SENTINEL: &str = "—";

/// Formats an hour of day as `HH:00`.
#[must_use]
pub fn format_hour(hour: u32) -> String {
    format!("{hour:02}:00")
}

/// Headline figures for the filtered record set.
///
/// `None` fields serialize as [`SENTINEL`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiSummary {
    /// Number of filtered records.
    pub total_calls: u64,
    /// Most frequent emergency type.
    #[serde(serialize_with = "sentinel_or_value")]
    pub most_common_type: Option<String>,
    /// Mean caller age, rounded to the nearest year.
    #[serde(serialize_with = "sentinel_or_value")]
    pub avg_age: Option<i64>,
    /// Busiest hour of day (0-23).
    #[serde(serialize_with = "sentinel_or_hour")]
    pub peak_hour: Option<u32>,
}

impl KpiSummary {
    /// Most common type, or [`SENTINEL`].
    #[must_use]
    pub fn most_common_type_label(&self) -> String {
        self.most_common_type
            .clone()
            .unwrap_or_else(|| SENTINEL.to_string())
    }

    /// Average age, or [`SENTINEL`].
    #[must_use]
    pub fn avg_age_label(&self) -> String {
        self.avg_age
            .map_or_else(|| SENTINEL.to_string(), |age| age.to_string())
    }

    /// Peak hour as `HH:00`, or [`SENTINEL`].
    #[must_use]
    pub fn peak_hour_label(&self) -> String {
        self.peak_hour
            .map_or_else(|| SENTINEL.to_string(), format_hour)
    }
}

#[allow(clippy::ref_option)]
fn sentinel_or_value<T: Serialize, S: Serializer>(
    value: &Option<T>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => v.serialize(serializer),
        None => serializer.serialize_str(SENTINEL),
    }
}

#[allow(clippy::ref_option, clippy::trivially_copy_pass_by_ref)]
fn sentinel_or_hour<S: Serializer>(value: &Option<u32>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(hour) => serializer.serialize_str(&format_hour(*hour)),
        None => serializer.serialize_str(SENTINEL),
    }
}

/// Count of records sharing one category value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    /// Category value (emergency type, gender, ...).
    pub key: String,
    /// Number of records.
    pub count: u64,
}

/// Fixed caller-age histogram bins.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum AgeBin {
    /// Ages 18 through 25.
    #[serde(rename = "18-25")]
    #[strum(serialize = "18-25")]
    YoungAdult,
    /// Ages 26 through 35.
    #[serde(rename = "26-35")]
    #[strum(serialize = "26-35")]
    Adult,
    /// Ages 36 through 45.
    #[serde(rename = "36-45")]
    #[strum(serialize = "36-45")]
    MiddleAged,
    /// Ages 46 through 55.
    #[serde(rename = "46-55")]
    #[strum(serialize = "46-55")]
    Mature,
    /// Ages 56 through 100.
    #[serde(rename = "56+")]
    #[strum(serialize = "56+")]
    Senior,
}

impl AgeBin {
    /// All bins in display order.
    pub const ALL: [Self; 5] = [
        Self::YoungAdult,
        Self::Adult,
        Self::MiddleAged,
        Self::Mature,
        Self::Senior,
    ];

    /// Lowest age in the bin.
    #[must_use]
    pub const fn min(self) -> i64 {
        match self {
            Self::YoungAdult => 18,
            Self::Adult => 26,
            Self::MiddleAged => 36,
            Self::Mature => 46,
            Self::Senior => 56,
        }
    }

    /// Highest age in the bin.
    #[must_use]
    pub const fn max(self) -> i64 {
        match self {
            Self::YoungAdult => 25,
            Self::Adult => 35,
            Self::MiddleAged => 45,
            Self::Mature => 55,
            Self::Senior => 100,
        }
    }

    /// Returns `true` if `age` falls inside the bin, both ends included.
    #[must_use]
    pub const fn contains(self, age: i64) -> bool {
        self.min() <= age && age <= self.max()
    }

    /// The bin containing `age`, if any. Ages below 18 or above 100 have
    /// no bin.
    #[must_use]
    pub fn for_age(age: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|bin| bin.contains(age))
    }
}

/// Number of records in one [`AgeBin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeBinCount {
    /// Bin label (`"18-25"`, ..., `"56+"`).
    pub range: AgeBin,
    /// Lowest age in the bin.
    pub min: i64,
    /// Highest age in the bin.
    pub max: i64,
    /// Number of records.
    pub count: u64,
}

impl AgeBinCount {
    /// An empty bin.
    #[must_use]
    pub const fn empty(range: AgeBin) -> Self {
        Self {
            range,
            min: range.min(),
            max: range.max(),
            count: 0,
        }
    }
}

/// Record count for one period of a time series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineBucket {
    /// Period key: `YYYY-MM` for months, `YYYY-MM-DD` for days.
    pub period: String,
    /// Number of records.
    pub count: u64,
}

/// A [`TimelineBucket`] annotated with series-wide statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedBucket {
    /// Month key (`YYYY-MM`).
    pub period: String,
    /// Number of records.
    pub count: u64,
    /// Mean count over the whole series.
    pub mean: f64,
    /// Population standard deviation of counts over the whole series.
    pub stddev: f64,
    /// Standard deviations between this bucket and the mean.
    pub z_score: f64,
    /// Whether `|z_score|` exceeds the anomaly threshold.
    pub is_anomaly: bool,
}

impl From<&EnrichedBucket> for TimelineBucket {
    fn from(bucket: &EnrichedBucket) -> Self {
        Self {
            period: bucket.period.clone(),
            count: bucket.count,
        }
    }
}

/// Headline for the anomaly alert banner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalySummary {
    /// Number of flagged buckets.
    pub anomaly_count: u64,
    /// Number of buckets in the series.
    pub total_data_points: u64,
    /// Flagged share of the series, in percent.
    pub percentage: f64,
}

/// One weighted point for the map heatmap layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapPoint {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
    /// Point weight.
    pub value: u32,
}

/// Choices offered by the filter panel, drawn from the full record set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    /// Distinct emergency types in first-seen order.
    pub types: Vec<String>,
    /// Distinct townships, sorted.
    pub townships: Vec<String>,
    /// Distinct postal codes, sorted.
    pub zipcodes: Vec<String>,
}

/// Count of records sharing one emergency type and subtype.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubtypeCount {
    /// Emergency type.
    pub emergency_type: String,
    /// Emergency subtype, absent when the record has none.
    pub emergency_subtype: Option<String>,
    /// Number of records.
    pub count: u64,
}

/// Operational breakdowns served next to the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallStats {
    /// Calls per township, busiest first.
    pub by_township: Vec<CategoryCount>,
    /// Calls per calendar day, ascending.
    pub daily: Vec<TimelineBucket>,
    /// Calls per type and subtype, busiest first.
    pub by_subtype: Vec<SubtypeCount>,
}

/// Everything the dashboard renders for one filter state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    /// Size of the unfiltered record set.
    pub total_records: u64,
    /// Headline KPIs.
    pub kpis: KpiSummary,
    /// Monthly call volume with anomaly flags.
    pub timeline: Vec<EnrichedBucket>,
    /// Calls per emergency type.
    pub by_type: Vec<CategoryCount>,
    /// Calls per caller age bin.
    pub by_age: [AgeBinCount; 5],
    /// Calls per caller gender.
    pub by_gender: Vec<CategoryCount>,
    /// Anomaly alert headline.
    pub anomalies: AnomalySummary,
    /// Heatmap layer points.
    pub heatmap: Vec<HeatmapPoint>,
    /// Filter panel choices.
    pub filter_options: FilterOptions,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_kpis_serialize_as_sentinels() {
        let json = serde_json::to_value(KpiSummary::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "totalCalls": 0,
                "mostCommonType": "—",
                "avgAge": "—",
                "peakHour": "—"
            })
        );
    }

    #[test]
    fn populated_kpis_serialize_values() {
        let kpis = KpiSummary {
            total_calls: 3,
            most_common_type: Some("EMS".to_string()),
            avg_age: Some(40),
            peak_hour: Some(5),
        };
        let json = serde_json::to_value(&kpis).unwrap();
        assert_eq!(json["avgAge"], 40);
        assert_eq!(json["peakHour"], "05:00");
        assert_eq!(kpis.peak_hour_label(), "05:00");
        assert_eq!(kpis.avg_age_label(), "40");
        assert_eq!(kpis.most_common_type_label(), "EMS");
    }

    #[test]
    fn age_bins_cover_18_to_100_without_overlap() {
        for age in 18..=100 {
            let hits = AgeBin::ALL.iter().filter(|b| b.contains(age)).count();
            assert_eq!(hits, 1, "age {age}");
        }
        assert_eq!(AgeBin::for_age(17), None);
        assert_eq!(AgeBin::for_age(101), None);
        assert_eq!(AgeBin::for_age(56), Some(AgeBin::Senior));
    }

    #[test]
    fn age_bin_labels() {
        let labels: Vec<String> = AgeBin::ALL.iter().map(ToString::to_string).collect();
        assert_eq!(labels, ["18-25", "26-35", "36-45", "46-55", "56+"]);
        assert_eq!("56+".parse::<AgeBin>().unwrap(), AgeBin::Senior);
        assert_eq!(
            serde_json::to_value(AgeBinCount::empty(AgeBin::Adult)).unwrap(),
            serde_json::json!({ "range": "26-35", "min": 26, "max": 35, "count": 0 })
        );
    }

    #[test]
    fn call_stats_serialize_camel_case() {
        let stats = CallStats {
            by_township: vec![CategoryCount {
                key: "ABINGTON".to_string(),
                count: 2,
            }],
            daily: vec![TimelineBucket {
                period: "2015-01-01".to_string(),
                count: 2,
            }],
            by_subtype: vec![SubtypeCount {
                emergency_type: "EMS".to_string(),
                emergency_subtype: None,
                count: 2,
            }],
        };
        assert_eq!(
            serde_json::to_value(&stats).unwrap(),
            serde_json::json!({
                "byTownship": [{ "key": "ABINGTON", "count": 2 }],
                "daily": [{ "period": "2015-01-01", "count": 2 }],
                "bySubtype": [{ "emergencyType": "EMS", "emergencySubtype": null, "count": 2 }]
            })
        );
    }
}
