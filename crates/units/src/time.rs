//! Date formats.
//!
//! Values are interpreted as UTC; time scales (TT, TDB) are not
//! distinguished. Everything pivots through the Julian date.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{MJD_ZERO_POINT, SECONDS_PER_DAY, UNIX_EPOCH_JD};
use crate::error::{UnitError, UnitResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeFormat {
    Mjd,
    Jd,
    Unix,
    Iso,
    Isot,
    DecimalYear,
}

impl TimeFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mjd => "mjd",
            Self::Jd => "jd",
            Self::Unix => "unix",
            Self::Iso => "iso",
            Self::Isot => "isot",
            Self::DecimalYear => "decimalyear",
        }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, Self::Iso | Self::Isot)
    }

    /// Julian date of a value written in this format.
    pub fn to_jd(&self, value: &TimeValue) -> UnitResult<f64> {
        let bad = || UnitError::BadDate {
            value: value.to_string(),
            format: self.as_str().to_string(),
        };
        if self.is_numeric() {
            let x = match value {
                TimeValue::Number(n) => *n,
                TimeValue::Text(s) => s.trim().parse::<f64>().map_err(|_| bad())?,
            };
            if !x.is_finite() {
                return Err(bad());
            }
            return Ok(match self {
                Self::Mjd => x + MJD_ZERO_POINT,
                Self::Jd => x,
                Self::Unix => x / SECONDS_PER_DAY + UNIX_EPOCH_JD,
                _ => decimal_year_to_jd(x).ok_or_else(bad)?,
            });
        }
        let text = match value {
            TimeValue::Text(s) => s,
            TimeValue::Number(_) => return Err(bad()),
        };
        let dt = parse_iso(text).ok_or_else(bad)?;
        Ok(datetime_to_jd(&dt))
    }

    /// Express a Julian date in this format.
    pub fn from_jd(&self, jd: f64) -> UnitResult<TimeValue> {
        let out_of_range = || UnitError::BadDate {
            value: jd.to_string(),
            format: "jd".to_string(),
        };
        Ok(match self {
            Self::Mjd => TimeValue::Number(jd - MJD_ZERO_POINT),
            Self::Jd => TimeValue::Number(jd),
            Self::Unix => TimeValue::Number((jd - UNIX_EPOCH_JD) * SECONDS_PER_DAY),
            Self::DecimalYear => {
                let dt = jd_to_datetime(jd).ok_or_else(out_of_range)?;
                TimeValue::Number(datetime_to_decimal_year(&dt).ok_or_else(out_of_range)?)
            }
            Self::Iso => {
                let dt = jd_to_datetime(jd).ok_or_else(out_of_range)?;
                TimeValue::Text(dt.format("%Y-%m-%d %H:%M:%S%.3f").to_string())
            }
            Self::Isot => {
                let dt = jd_to_datetime(jd).ok_or_else(out_of_range)?;
                TimeValue::Text(dt.format("%Y-%m-%dT%H:%M:%S%.3f").to_string())
            }
        })
    }

    pub fn convert(&self, value: &TimeValue, to: TimeFormat) -> UnitResult<TimeValue> {
        to.from_jd(self.to_jd(value)?)
    }
}

impl fmt::Display for TimeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeFormat {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mjd" => Ok(Self::Mjd),
            "jd" => Ok(Self::Jd),
            "unix" => Ok(Self::Unix),
            "iso" => Ok(Self::Iso),
            "isot" => Ok(Self::Isot),
            "decimalyear" | "decimal_year" | "year" => Ok(Self::DecimalYear),
            _ => Err(UnitError::UnknownTimeFormat(s.to_string())),
        }
    }
}

/// A date as written: numeric formats carry a number, ISO formats text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimeValue {
    Number(f64),
    Text(String),
}

impl TimeValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for TimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

// ---------------------------------------------------------------------------
// chrono bridges
// ---------------------------------------------------------------------------

const ISO_PATTERNS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

fn parse_iso(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim().trim_end_matches('Z');
    ISO_PATTERNS
        .iter()
        .find_map(|p| NaiveDateTime::parse_from_str(s, p).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn datetime_to_jd(dt: &DateTime<Utc>) -> f64 {
    let secs = dt.timestamp() as f64 + f64::from(dt.timestamp_subsec_nanos()) * 1e-9;
    secs / SECONDS_PER_DAY + UNIX_EPOCH_JD
}

fn jd_to_datetime(jd: f64) -> Option<DateTime<Utc>> {
    if !jd.is_finite() {
        return None;
    }
    let secs = (jd - UNIX_EPOCH_JD) * SECONDS_PER_DAY;
    let whole = secs.floor();
    // round to the microsecond to keep output stable
    let nanos = (((secs - whole) * 1e6).round() as u32).min(999_999) * 1_000;
    DateTime::from_timestamp(whole as i64, nanos)
}

fn year_bounds(year: i32) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).single()?;
    let end = Utc.with_ymd_and_hms(year + 1, 1, 1, 0, 0, 0).single()?;
    Some((start, end))
}

fn decimal_year_to_jd(x: f64) -> Option<f64> {
    let year = x.floor() as i32;
    let (start, end) = year_bounds(year)?;
    let (a, b) = (datetime_to_jd(&start), datetime_to_jd(&end));
    Some(a + (x - f64::from(year)) * (b - a))
}

fn datetime_to_decimal_year(dt: &DateTime<Utc>) -> Option<f64> {
    let (start, end) = year_bounds(dt.year())?;
    let (a, b) = (datetime_to_jd(&start), datetime_to_jd(&end));
    Some(f64::from(dt.year()) + (datetime_to_jd(dt) - a) / (b - a))
}
