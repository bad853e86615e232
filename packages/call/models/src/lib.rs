#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Emergency call record and filter criteria types.
//!
//! [`CallRecord`] is the canonical shape of one emergency call as supplied
//! by the record source (CSV export, `/calls` API response or the frontend
//! mock generator). [`FilterCriteria`] is the dashboard's filter state. Both
//! are plain data: the analytics pipeline only ever borrows them.

mod lenient;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike as _};
use serde::{Deserialize, Serialize};

/// Display format used when serializing [`DateRange`] bounds.
const BOUND_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Parses a call timestamp.
///
/// Accepts `YYYY-MM-DD HH:MM:SS` (the 911 dataset export),
/// `YYYY-MM-DDTHH:MM:SS` with optional fractional seconds, RFC 3339 (converted
/// to UTC) and bare `YYYY-MM-DD` dates (midnight). Returns `None` for
/// anything else.
#[must_use]
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();

    for format in [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive);
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// A single emergency call.
///
/// Field names serialize as `camelCase`; the `snake_case` and raw dataset
/// column names (`timeStamp`, `twp`, `zip`, `lat`, `lng`, ...) are accepted
/// on input so the same type loads from every record source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRecord {
    /// Unique identifier, stable per record.
    #[serde(default, deserialize_with = "lenient::text")]
    pub id: String,
    /// When the call was received, as supplied by the source.
    ///
    /// Kept unparsed so a malformed value excludes the record from
    /// date-dependent views instead of failing the whole load. See
    /// [`CallRecord::occurred_at`].
    #[serde(default, alias = "timeStamp", deserialize_with = "lenient::text")]
    pub timestamp: String,
    /// Emergency category (e.g. `"EMS"`, `"Fire"`, `"Traffic"`).
    #[serde(default, alias = "emergency_type", deserialize_with = "lenient::text")]
    pub emergency_type: String,
    /// Free-form subcategory (e.g. `"VEHICLE ACCIDENT"`).
    #[serde(
        default,
        alias = "emergency_subtype",
        deserialize_with = "lenient::opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub emergency_subtype: Option<String>,
    /// Caller age in years, if known and numeric.
    #[serde(default, alias = "caller_age", deserialize_with = "lenient::int")]
    pub caller_age: Option<i64>,
    /// Caller gender.
    #[serde(default, alias = "caller_gender", deserialize_with = "lenient::text")]
    pub caller_gender: String,
    /// Latitude.
    #[serde(default, alias = "lat", deserialize_with = "lenient::float")]
    pub latitude: Option<f64>,
    /// Longitude.
    #[serde(default, alias = "lng", deserialize_with = "lenient::float")]
    pub longitude: Option<f64>,
    /// Township (called `district` by the API).
    #[serde(
        default,
        alias = "twp",
        alias = "district",
        deserialize_with = "lenient::text"
    )]
    pub township: String,
    /// Postal code. Numeric source values are normalized to integer text.
    #[serde(default, alias = "zip", deserialize_with = "lenient::text")]
    pub zipcode: String,
    /// Call description.
    #[serde(
        default,
        alias = "desc",
        deserialize_with = "lenient::opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,
    /// Response time in minutes.
    #[serde(
        default,
        alias = "response_time",
        deserialize_with = "lenient::int",
        skip_serializing_if = "Option::is_none"
    )]
    pub response_time: Option<i64>,
}

impl CallRecord {
    /// Parses [`Self::timestamp`]. `None` means the timestamp is malformed.
    #[must_use]
    pub fn occurred_at(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.timestamp)
    }

    /// Calendar month key (`YYYY-MM`) of the call.
    #[must_use]
    pub fn month_key(&self) -> Option<String> {
        self.occurred_at().map(|t| t.format("%Y-%m").to_string())
    }

    /// Calendar day key (`YYYY-MM-DD`) of the call.
    #[must_use]
    pub fn day_key(&self) -> Option<String> {
        self.occurred_at().map(|t| t.format("%Y-%m-%d").to_string())
    }

    /// Hour of day (0-23) of the call.
    #[must_use]
    pub fn hour_of_day(&self) -> Option<u32> {
        self.occurred_at().map(|t| t.hour())
    }

    /// Latitude/longitude pair, when both are present.
    #[must_use]
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }
}

/// Error produced when user-supplied filter criteria cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CriteriaError {
    /// A date range bound is not a recognized date or datetime.
    #[error("invalid date '{value}': expected YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS")]
    InvalidDate {
        /// The rejected input.
        value: String,
    },
}

/// Parses one date range bound. Date-only values mean midnight.
///
/// # Errors
///
/// Returns [`CriteriaError::InvalidDate`] if `value` is not a recognized
/// date or datetime.
pub fn parse_bound(value: &str) -> Result<NaiveDateTime, CriteriaError> {
    parse_timestamp(value).ok_or_else(|| CriteriaError::InvalidDate {
        value: value.to_string(),
    })
}

/// Inclusive instant range.
///
/// A range whose start lies after its end is valid and matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDateRange", into = "RawDateRange")]
pub struct DateRange {
    /// First instant included.
    pub start: NaiveDateTime,
    /// Last instant included.
    pub end: NaiveDateTime,
}

impl DateRange {
    /// Creates a range from already-parsed bounds.
    #[must_use]
    pub const fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// Parses both bounds from user input.
    ///
    /// # Errors
    ///
    /// Returns [`CriteriaError`] if either bound cannot be parsed.
    pub fn parse(start: &str, end: &str) -> Result<Self, CriteriaError> {
        Ok(Self::new(parse_bound(start)?, parse_bound(end)?))
    }

    /// Returns `true` if `instant` lies within the range, both ends included.
    #[must_use]
    pub fn contains(&self, instant: &NaiveDateTime) -> bool {
        self.start <= *instant && *instant <= self.end
    }
}

impl Default for DateRange {
    /// Calendar year 2015, the span of the bundled 911 dataset.
    fn default() -> Self {
        let midnight = |y, m, d| {
            NaiveDate::from_ymd_opt(y, m, d)
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .unwrap_or_default()
        };
        Self::new(midnight(2015, 1, 1), midnight(2015, 12, 31))
    }
}

#[derive(Serialize, Deserialize)]
struct RawDateRange {
    start: String,
    end: String,
}

impl TryFrom<RawDateRange> for DateRange {
    type Error = CriteriaError;

    fn try_from(raw: RawDateRange) -> Result<Self, Self::Error> {
        Self::parse(&raw.start, &raw.end)
    }
}

impl From<DateRange> for RawDateRange {
    fn from(range: DateRange) -> Self {
        Self {
            start: range.start.format(BOUND_FORMAT).to_string(),
            end: range.end.format(BOUND_FORMAT).to_string(),
        }
    }
}

/// Dashboard filter state.
///
/// Empty `types`, `township` and `zipcode` are wildcards that match every
/// record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    /// Inclusive time window.
    #[serde(default)]
    pub date_range: DateRange,
    /// Emergency types to include. Empty matches all types.
    #[serde(default)]
    pub types: Vec<String>,
    /// Exact township to match. Empty matches all townships.
    #[serde(default)]
    pub township: String,
    /// Exact postal code to match. Empty matches all postal codes.
    #[serde(default)]
    pub zipcode: String,
}

impl FilterCriteria {
    /// Criteria that match every record within `date_range`.
    #[must_use]
    pub fn for_range(date_range: DateRange) -> Self {
        Self {
            date_range,
            ..Self::default()
        }
    }

    /// Replaces the set of emergency types.
    #[must_use]
    pub fn with_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types = types.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the township filter.
    #[must_use]
    pub fn with_township(mut self, township: impl Into<String>) -> Self {
        self.township = township.into();
        self
    }

    /// Sets the postal code filter.
    #[must_use]
    pub fn with_zipcode(mut self, zipcode: impl Into<String>) -> Self {
        self.zipcode = zipcode.into();
        self
    }
}
