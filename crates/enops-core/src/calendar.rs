//! Calendar features derived from a forecast grid timestamp.
//!
//! Hours are matched against closed `(start, end)` windows. A window whose
//! start is after its end matches nothing; callers that need a window wrapping
//! midnight must list both halves.

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Morning and evening peak windows, inclusive.
pub const PEAK_WINDOWS: [(u32, u32); 2] = [(7, 9), (17, 21)];

/// Late evening and the hour before the morning peak.
const SHOULDER_WINDOWS: [(u32, u32); 2] = [(22, 23), (6, 6)];

/// Returns true when `hour` lies in the closed window `(start, end)`.
pub fn hour_in(hour: u32, window: (u32, u32)) -> bool {
    window.0 <= hour && hour <= window.1
}

pub fn is_peak_hour(hour: u32) -> bool {
    PEAK_WINDOWS.iter().any(|w| hour_in(hour, *w))
}

/// Tariff-style bucket for an hour of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeakPeriod {
    Peak,
    Shoulder,
    Other,
}

impl PeakPeriod {
    pub fn classify(hour: u32) -> Self {
        if is_peak_hour(hour) {
            PeakPeriod::Peak
        } else if SHOULDER_WINDOWS.iter().any(|w| hour_in(hour, *w)) {
            PeakPeriod::Shoulder
        } else {
            PeakPeriod::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PeakPeriod::Peak => "peak",
            PeakPeriod::Shoulder => "shoulder",
            PeakPeriod::Other => "other",
        }
    }
}

impl fmt::Display for PeakPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PeakPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "peak" => Ok(PeakPeriod::Peak),
            "shoulder" => Ok(PeakPeriod::Shoulder),
            "other" => Ok(PeakPeriod::Other),
            other => Err(format!(
                "unknown peak period '{other}'; expected peak, shoulder or other"
            )),
        }
    }
}

/// Features attached to every forecast row.
///
/// `day_of_week` counts from Monday = 0 to Sunday = 6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarFeatures {
    pub hour: u32,
    pub day_of_week: u32,
    pub is_weekend: bool,
    pub peak_period: PeakPeriod,
}

impl CalendarFeatures {
    pub fn from_timestamp(ts: NaiveDateTime) -> Self {
        let hour = ts.hour();
        let day_of_week = ts.weekday().num_days_from_monday();
        Self {
            hour,
            day_of_week,
            is_weekend: day_of_week >= 5,
            peak_period: PeakPeriod::classify(hour),
        }
    }

    /// Weekend flag in the 0/1 form written to the output tables.
    pub fn weekend_flag(&self) -> i32 {
        i32::from(self.is_weekend)
    }
}
