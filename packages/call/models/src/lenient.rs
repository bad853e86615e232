//! Tolerant field deserializers for [`crate::CallRecord`].
//!
//! Record sources disagree on scalar types: the CSV export stores postal
//! codes as floats (`19525.0`), the API returns numeric ids, and simulated
//! rows may carry non-numeric ages. These helpers accept any scalar and
//! never fail on a type mismatch, so one odd field cannot reject a record.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    fn into_text(self) -> String {
        match self {
            Self::Bool(b) => b.to_string(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) if f.is_finite() && f.fract() == 0.0 => format!("{f:.0}"),
            Self::Float(f) => f.to_string(),
            Self::Text(s) => match strip_zero_fraction(&s) {
                Some(int) => int.to_string(),
                None => s,
            },
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn into_int(self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(i),
            Self::Float(f) if f.is_finite() && f.fract() == 0.0 => Some(f as i64),
            Self::Text(s) => {
                let s = s.trim();
                s.parse().ok().or_else(|| {
                    s.parse::<f64>()
                        .ok()
                        .filter(|f| f.is_finite() && f.fract() == 0.0)
                        .map(|f| f as i64)
                })
            }
            Self::Bool(_) | Self::Float(_) => None,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn into_float(self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(i as f64),
            Self::Float(f) => Some(f),
            Self::Text(s) => s.trim().parse().ok(),
            Self::Bool(_) => None,
        }
        .filter(|f| f.is_finite())
    }
}

/// `"19525.0"` -> `"19525"`. Leading zeros in the integer part are kept.
fn strip_zero_fraction(s: &str) -> Option<&str> {
    let (int, frac) = s.split_once('.')?;
    let all_digits = !int.is_empty() && int.bytes().all(|b| b.is_ascii_digit());
    (all_digits && frac.bytes().all(|b| b == b'0')).then_some(int)
}

/// Any scalar as text; missing or null becomes the empty string.
pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<Scalar>::deserialize(deserializer)?
        .map(Scalar::into_text)
        .unwrap_or_default())
}

/// Any scalar as text; missing, null or empty becomes `None`.
pub fn opt_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<Scalar>::deserialize(deserializer)?
        .map(Scalar::into_text)
        .filter(|s| !s.is_empty()))
}

/// Integral scalar; anything non-integral becomes `None`.
pub fn int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    Ok(Option::<Scalar>::deserialize(deserializer)?.and_then(Scalar::into_int))
}

/// Finite numeric scalar; anything else becomes `None`.
pub fn float<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(Option::<Scalar>::deserialize(deserializer)?.and_then(Scalar::into_float))
}
