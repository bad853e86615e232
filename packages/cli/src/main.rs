#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the emergency call dashboard.
//!
//! Loads a CSV or JSON record export, applies the filter state assembled
//! from `crisis_lens.toml` and the command line, and prints the requested
//! view as JSON on stdout. Logging goes to stderr via `RUST_LOG`.

mod config;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use crisis_lens_analytics::{
    aggregate_timeline, build_dashboard, build_stats, detect_timeline_anomalies, filter_options,
    filter_refs, summarize_anomalies,
};
use crisis_lens_analytics_models::{AnomalySummary, EnrichedBucket};
use serde::Serialize;

use crate::config::{Config, Overrides, Settings};

/// Config file read from the working directory when `--config` is absent.
const DEFAULT_CONFIG_FILE: &str = "crisis_lens.toml";

#[derive(Parser)]
#[command(name = "crisis_lens", about = "Emergency call analytics dashboard")]
struct Cli {
    /// Config file (defaults to `crisis_lens.toml` if it exists)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Record file to load (.csv or .json)
    #[arg(long, global = true)]
    records: Option<PathBuf>,
    /// Start of the date range, inclusive (e.g. 2015-01-01)
    #[arg(long, global = true)]
    from: Option<String>,
    /// End of the date range, inclusive (e.g. 2015-12-31)
    #[arg(long, global = true)]
    to: Option<String>,
    /// Emergency type to include; repeat for several. Omit for all types
    #[arg(long = "type", global = true)]
    types: Vec<String>,
    /// Township to match exactly
    #[arg(long, global = true)]
    township: Option<String>,
    /// Postal code to match exactly
    #[arg(long, global = true)]
    zipcode: Option<String>,
    /// Maximum number of heatmap points
    #[arg(long, global = true)]
    heatmap_limit: Option<usize>,
    /// Pretty-print the JSON output
    #[arg(long, global = true)]
    pretty: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Clone, Copy)]
enum Commands {
    /// Print the full dashboard view (default)
    Dashboard,
    /// Print the values offered by the filter panel
    Options,
    /// Print the monthly timeline with anomaly flags
    Anomalies,
    /// Print calls per township, per day and per type/subtype
    Stats,
}

/// Output of the `anomalies` subcommand.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnomalyReport {
    timeline: Vec<EnrichedBucket>,
    summary: AnomalySummary,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            records: self.records.clone(),
            start: self.from.clone(),
            end: self.to.clone(),
            types: self.types.clone(),
            township: self.township.clone(),
            zipcode: self.zipcode.clone(),
            heatmap_limit: self.heatmap_limit,
        }
    }

    fn load_config(&self) -> Result<Config, config::ConfigError> {
        if let Some(path) = &self.config {
            return Config::load(path);
        }
        let default = PathBuf::from(DEFAULT_CONFIG_FILE);
        if default.is_file() {
            Config::load(&default)
        } else {
            Ok(Config::default())
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let Settings {
        records: path,
        criteria,
        options,
    } = config::resolve(cli.load_config()?, cli.overrides())?;
    log::debug!("Filter criteria: {criteria:?}");

    let records = crisis_lens_source::load_records(&path)?;

    let output = match cli.command.unwrap_or(Commands::Dashboard) {
        Commands::Dashboard => {
            let view = build_dashboard(&records, &criteria, options);
            log::info!(
                "{} of {} calls match the current filters",
                view.kpis.total_calls,
                view.total_records
            );
            to_json(&view, cli.pretty)?
        }
        Commands::Options => to_json(&filter_options(&records), cli.pretty)?,
        Commands::Anomalies => {
            let filtered = filter_refs(&records, &criteria);
            let timeline = detect_timeline_anomalies(&aggregate_timeline(filtered));
            let summary = summarize_anomalies(&timeline);
            log::info!(
                "{} of {} months flagged as anomalous",
                summary.anomaly_count,
                summary.total_data_points
            );
            to_json(&AnomalyReport { timeline, summary }, cli.pretty)?
        }
        Commands::Stats => to_json(&build_stats(&records, &criteria), cli.pretty)?,
    };

    println!("{output}");

    Ok(())
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}
