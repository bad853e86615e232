//! TOML configuration and its merge with command-line flags.
//!
//! Precedence: command-line flags, then the config file, then the built-in
//! defaults ([`FilterCriteria::default`], [`DashboardOptions::default`]).

use std::path::{Path, PathBuf};

use crisis_lens_analytics::DashboardOptions;
use crisis_lens_call_models::{CriteriaError, DateRange, FilterCriteria, parse_bound};
use serde::Deserialize;

/// Errors that can occur while resolving the run configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read config {path}: {source}")]
    Io {
        /// Config file path.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`Config`].
    #[error("Invalid config: {0}")]
    Toml(#[from] toml::de::Error),

    /// A filter value could not be parsed.
    #[error(transparent)]
    Criteria(#[from] CriteriaError),

    /// Neither `--records` nor the config file names a record file.
    #[error("No record file given: pass --records or set `records` in the config file")]
    MissingRecords,
}

/// Contents of `crisis_lens.toml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Record file to load.
    pub records: Option<PathBuf>,
    /// Maximum number of heatmap points.
    pub heatmap_limit: Option<usize>,
    /// Initial filter state.
    pub filters: FilterConfig,
}

/// `[filters]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterConfig {
    /// Start of the date range (`YYYY-MM-DD` or `YYYY-MM-DDTHH:MM:SS`).
    pub start: Option<String>,
    /// End of the date range, inclusive.
    pub end: Option<String>,
    /// Emergency types to include.
    pub types: Option<Vec<String>>,
    /// Township to match exactly.
    pub township: Option<String>,
    /// Postal code to match exactly.
    pub zipcode: Option<String>,
}

impl Config {
    /// Parses a config document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] on malformed TOML or unknown keys.
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Reads and parses a config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        log::debug!("Loaded config from {}", path.display());
        Self::parse(&contents)
    }
}

/// Filter and input overrides taken from the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    /// `--records`.
    pub records: Option<PathBuf>,
    /// `--from`.
    pub start: Option<String>,
    /// `--to`.
    pub end: Option<String>,
    /// `--type`, repeatable. Empty means "not given".
    pub types: Vec<String>,
    /// `--township`.
    pub township: Option<String>,
    /// `--zipcode`.
    pub zipcode: Option<String>,
    /// `--heatmap-limit`.
    pub heatmap_limit: Option<usize>,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Record file to load.
    pub records: PathBuf,
    /// Filter state to apply.
    pub criteria: FilterCriteria,
    /// Pipeline options.
    pub options: DashboardOptions,
}

/// Merges command-line overrides over the config file.
///
/// # Errors
///
/// Returns [`ConfigError`] if no record file is given or a date bound is
/// malformed.
pub fn resolve(config: Config, overrides: Overrides) -> Result<Settings, ConfigError> {
    let records = overrides
        .records
        .or(config.records)
        .ok_or(ConfigError::MissingRecords)?;

    let filters = config.filters;
    let defaults = DateRange::default();

    let start = match overrides.start.or(filters.start) {
        Some(s) => parse_bound(&s)?,
        None => defaults.start,
    };
    let end = match overrides.end.or(filters.end) {
        Some(s) => parse_bound(&s)?,
        None => defaults.end,
    };

    let types = if overrides.types.is_empty() {
        filters.types.unwrap_or_default()
    } else {
        overrides.types
    };

    let criteria = FilterCriteria::for_range(DateRange::new(start, end))
        .with_types(types)
        .with_township(overrides.township.or(filters.township).unwrap_or_default())
        .with_zipcode(overrides.zipcode.or(filters.zipcode).unwrap_or_default());

    let mut options = DashboardOptions::default();
    if let Some(limit) = overrides.heatmap_limit.or(config.heatmap_limit) {
        options.heatmap_limit = limit;
    }

    Ok(Settings {
        records,
        criteria,
        options,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
records = "data/calls.csv"
heatmap_limit = 50

[filters]
start = "2015-03-01"
end = "2015-03-31T23:59:59"
types = ["EMS", "Fire"]
township = "ABINGTON"
"#;

    #[test]
    fn parses_full_config() {
        let config = Config::parse(SAMPLE).unwrap();
        assert_eq!(config.records, Some(PathBuf::from("data/calls.csv")));
        assert_eq!(config.heatmap_limit, Some(50));
        assert_eq!(config.filters.types, Some(vec!["EMS".to_string(), "Fire".to_string()]));
        assert_eq!(config.filters.zipcode, None);
    }

    #[test]
    fn empty_config_is_default() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(matches!(
            Config::parse("recordz = \"x.csv\""),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn config_values_apply_without_overrides() {
        let settings = resolve(Config::parse(SAMPLE).unwrap(), Overrides::default()).unwrap();
        assert_eq!(settings.records, PathBuf::from("data/calls.csv"));
        assert_eq!(settings.options.heatmap_limit, 50);
        assert_eq!(settings.criteria.types, ["EMS", "Fire"]);
        assert_eq!(settings.criteria.township, "ABINGTON");
        assert!(settings.criteria.zipcode.is_empty());
        assert_eq!(
            settings.criteria.date_range,
            DateRange::parse("2015-03-01", "2015-03-31T23:59:59").unwrap()
        );
    }

    #[test]
    fn overrides_win_over_config() {
        let overrides = Overrides {
            records: Some(PathBuf::from("other.json")),
            start: Some("2015-06-01".to_string()),
            types: vec!["Traffic".to_string()],
            township: Some(String::new()),
            zipcode: Some("19401".to_string()),
            heatmap_limit: Some(10),
            ..Overrides::default()
        };
        let settings = resolve(Config::parse(SAMPLE).unwrap(), overrides).unwrap();
        assert_eq!(settings.records, PathBuf::from("other.json"));
        assert_eq!(settings.criteria.types, ["Traffic"]);
        assert!(settings.criteria.township.is_empty());
        assert_eq!(settings.criteria.zipcode, "19401");
        assert_eq!(settings.options.heatmap_limit, 10);
        assert_eq!(
            settings.criteria.date_range,
            DateRange::parse("2015-06-01", "2015-03-31T23:59:59").unwrap()
        );
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let overrides = Overrides {
            records: Some(PathBuf::from("calls.csv")),
            ..Overrides::default()
        };
        let settings = resolve(Config::default(), overrides).unwrap();
        assert_eq!(settings.criteria, FilterCriteria::default());
        assert_eq!(settings.options, DashboardOptions::default());
    }

    #[test]
    fn missing_records_is_an_error() {
        assert!(matches!(
            resolve(Config::default(), Overrides::default()),
            Err(ConfigError::MissingRecords)
        ));
    }

    #[test]
    fn malformed_date_is_an_error() {
        let overrides = Overrides {
            records: Some(PathBuf::from("calls.csv")),
            end: Some("the end".to_string()),
            ..Overrides::default()
        };
        assert!(matches!(
            resolve(Config::default(), overrides),
            Err(ConfigError::Criteria(CriteriaError::InvalidDate { .. }))
        ));
    }
}
