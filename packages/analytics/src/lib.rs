#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Filter, aggregate and anomaly-detect pipeline over emergency call
//! records.
//!
//! Every public function is a pure function of its borrowed inputs:
//! records and criteria are never mutated and no state survives between
//! calls. The [`dashboard::build_dashboard`] entry point wires the stages
//! together in dependency order; the individual stages are also exported
//! for callers that only need one view.

pub mod aggregate;
pub mod anomaly;
pub mod counter;
pub mod dashboard;
pub mod filter;
pub mod kpi;

#[cfg(test)]
mod test_support;

pub use aggregate::{
    aggregate_by_age, aggregate_by_gender, aggregate_by_subtype, aggregate_by_township,
    aggregate_by_type, aggregate_daily, aggregate_timeline,
};
pub use anomaly::{ANOMALY_Z_THRESHOLD, detect_timeline_anomalies, summarize_anomalies};
pub use dashboard::{
    DashboardOptions, build_dashboard, build_stats, filter_options, heatmap_points,
};
pub use filter::{filter_records, filter_refs, matches};
pub use kpi::compute_kpis;
