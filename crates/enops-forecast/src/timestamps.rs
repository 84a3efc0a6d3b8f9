//! Locating and coercing the timestamp column of a history table.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::*;

use crate::error::{ForecastError, ForecastResult};

/// Column names accepted as the timestamp, in priority order.
/// Matching ignores ASCII case; the first candidate present wins.
pub const TIMESTAMP_CANDIDATES: [&str; 8] = [
    "datetime",
    "timestamp",
    "settlementdate",
    "settlement_date",
    "date_time",
    "interval_start",
    "date",
    "time",
];

const DATETIME_LAYOUTS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

pub fn resolve_timestamp_column<'a>(columns: &[&'a str]) -> ForecastResult<&'a str> {
    for candidate in TIMESTAMP_CANDIDATES {
        if let Some(found) = columns.iter().find(|c| c.eq_ignore_ascii_case(candidate)) {
            return Ok(*found);
        }
    }
    Err(ForecastError::DataFormat(format!(
        "no timestamp column found; expected one of [{}], got [{}]",
        TIMESTAMP_CANDIDATES.join(", "),
        columns.join(", ")
    )))
}

/// Parse a single timestamp string.
///
/// RFC 3339 values keep their wall-clock time and drop the offset.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }
    for layout in DATETIME_LAYOUTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, layout) {
            return Some(dt);
        }
    }
    ["%Y-%m-%d", "%Y/%m/%d"]
        .iter()
        .find_map(|layout| NaiveDate::parse_from_str(value, layout).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Coerce a column into timestamps, keeping nulls as `None`.
///
/// Native `Datetime`/`Date` columns convert directly; strings are parsed with
/// [`parse_timestamp`]; integers are Unix epoch seconds. A non-null value that
/// cannot be interpreted is a data-format error.
pub fn coerce_timestamps(series: &Series) -> ForecastResult<Vec<Option<NaiveDateTime>>> {
    let name = series.name().to_string();
    match series.dtype() {
        DataType::Datetime(unit, _) => {
            let unit = *unit;
            let raw = series.cast(&DataType::Int64)?;
            raw.i64()?
                .into_iter()
                .map(|v| v.map(|v| from_epoch(v, unit, &name)).transpose())
                .collect()
        }
        DataType::Date => {
            let raw = series.cast(&DataType::Int32)?;
            raw.i32()?
                .into_iter()
                .map(|v| v.map(|days| days_to_timestamp(days, &name)).transpose())
                .collect()
        }
        DataType::Utf8 => series
            .utf8()?
            .into_iter()
            .map(|v| match v {
                None => Ok(None),
                Some(s) if s.trim().is_empty() => Ok(None),
                Some(s) => parse_timestamp(s).map(Some).ok_or_else(|| {
                    ForecastError::DataFormat(format!(
                        "column '{name}' has a value that is not a timestamp: '{s}'"
                    ))
                }),
            })
            .collect(),
        dtype if dtype.is_integer() => {
            let raw = series.cast(&DataType::Int64)?;
            raw.i64()?
                .into_iter()
                .map(|v| v.map(|secs| seconds_to_timestamp(secs, &name)).transpose())
                .collect()
        }
        other => Err(ForecastError::DataFormat(format!(
            "column '{name}' has type {other} which cannot be read as a timestamp"
        ))),
    }
}

fn from_epoch(value: i64, unit: TimeUnit, column: &str) -> ForecastResult<NaiveDateTime> {
    let per_second: i64 = match unit {
        TimeUnit::Nanoseconds => 1_000_000_000,
        TimeUnit::Microseconds => 1_000_000,
        TimeUnit::Milliseconds => 1_000,
    };
    let secs = value.div_euclid(per_second);
    let nanos = value.rem_euclid(per_second) * (1_000_000_000 / per_second);
    DateTime::from_timestamp(secs, nanos as u32)
        .map(|dt| dt.naive_utc())
        .ok_or_else(|| {
            ForecastError::DataFormat(format!(
                "column '{column}' has an out-of-range timestamp value {value}"
            ))
        })
}

fn seconds_to_timestamp(secs: i64, column: &str) -> ForecastResult<NaiveDateTime> {
    DateTime::from_timestamp(secs, 0)
        .map(|dt| dt.naive_utc())
        .ok_or_else(|| {
            ForecastError::DataFormat(format!(
                "column '{column}' has an out-of-range epoch value {secs}"
            ))
        })
}

fn days_to_timestamp(days: i32, column: &str) -> ForecastResult<NaiveDateTime> {
    seconds_to_timestamp(i64::from(days) * 86_400, column)
}
