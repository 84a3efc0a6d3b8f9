use chrono::{Duration, NaiveDateTime, Timelike};

pub const INTERVAL_MINUTES: i64 = 30;
pub const HORIZON_DAYS: i64 = 7;
/// 7 days of half-hour intervals.
pub const HORIZON_STEPS: usize = (HORIZON_DAYS * 24 * 60 / INTERVAL_MINUTES) as usize;

/// The fixed forecast horizon: [`HORIZON_STEPS`] timestamps spaced
/// [`INTERVAL_MINUTES`] apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastGrid {
    timestamps: Vec<NaiveDateTime>,
}

impl ForecastGrid {
    /// Grid starting one interval after the latest observed timestamp.
    ///
    /// Sub-second precision is dropped first, since the output tables store
    /// whole seconds.
    pub fn after(last_observed: NaiveDateTime) -> Self {
        let last_observed = last_observed.with_nanosecond(0).unwrap_or(last_observed);
        let step = Duration::minutes(INTERVAL_MINUTES);
        let timestamps = (1..=HORIZON_STEPS as i32)
            .map(|i| last_observed + step * i)
            .collect();
        Self { timestamps }
    }

    pub fn start(&self) -> NaiveDateTime {
        self.timestamps[0]
    }

    pub fn end(&self) -> NaiveDateTime {
        self.timestamps[self.timestamps.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NaiveDateTime> {
        self.timestamps.iter()
    }
}
