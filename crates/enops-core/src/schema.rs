//! Names shared by everything that writes or reads the forecast tables.

use std::fmt;

/// Layout of the `datetime` column in every output table.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Region used when the history carries no region column.
pub const DEFAULT_REGION: &str = "NSW1";

pub const COL_DATETIME: &str = "datetime";
pub const COL_HOUR: &str = "hour";
pub const COL_DAY_OF_WEEK: &str = "day_of_week";
pub const COL_IS_WEEKEND: &str = "is_weekend";
pub const COL_PEAK_PERIOD: &str = "peak_period";
pub const COL_REGION: &str = "region";
pub const COL_FORECAST_PRICE: &str = "forecast_price";
pub const COL_FORECAST_DEMAND: &str = "forecast_demand";
pub const COL_DELTA_PRICE: &str = "delta_price";
pub const COL_DELTA_DEMAND: &str = "delta_demand";

/// Weather, lag and rolling-window inputs reserved for a future model.
/// Written as all-null columns between `peak_period` and `region`.
pub const PLACEHOLDER_COLUMNS: [&str; 21] = [
    "temp_c",
    "rh_pct",
    "rain_mm",
    "sunshine_sec",
    "shortwave_wm2",
    "wind_speed_ms",
    "temp_bin",
    "spike_flag",
    "compound_highTemp_lowSolar_peakHour",
    "RRP_lag_1h",
    "RRP_lag_12h",
    "RRP_lag_24h",
    "TOTALDEMAND_lag_1h",
    "TOTALDEMAND_lag_12h",
    "TOTALDEMAND_lag_24h",
    "RRP_rolling_3h",
    "RRP_rolling_6h",
    "RRP_rolling_24h",
    "TOTALDEMAND_rolling_3h",
    "TOTALDEMAND_rolling_6h",
    "TOTALDEMAND_rolling_24h",
];

/// The three tables produced by every forecast run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ForecastTable {
    Baseline,
    Shock,
    Delta,
}

impl ForecastTable {
    pub const ALL: [ForecastTable; 3] = [
        ForecastTable::Baseline,
        ForecastTable::Shock,
        ForecastTable::Delta,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            ForecastTable::Baseline => "forecast_baseline.csv",
            ForecastTable::Shock => "forecast_scenario_shock.csv",
            ForecastTable::Delta => "forecast_scenario_delta.csv",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ForecastTable::Baseline => "baseline",
            ForecastTable::Shock => "shock",
            ForecastTable::Delta => "delta",
        }
    }
}

impl fmt::Display for ForecastTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_names_are_distinct() {
        let names: std::collections::HashSet<_> =
            ForecastTable::ALL.iter().map(|t| t.file_name()).collect();
        assert_eq!(names.len(), 3);
        assert!(names.iter().all(|n| n.starts_with("forecast_") && n.ends_with(".csv")));
    }

    #[test]
    fn test_placeholders_do_not_shadow_value_columns() {
        for name in PLACEHOLDER_COLUMNS {
            assert_ne!(name, COL_FORECAST_PRICE);
            assert_ne!(name, COL_FORECAST_DEMAND);
            assert_ne!(name, COL_REGION);
        }
    }
}
