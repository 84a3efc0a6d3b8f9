//! Reading previously written forecast tables back into typed rows.
//!
//! Consumers (scenario analytics, dashboards) only need the value columns;
//! calendar features are recomputed from `datetime` and the placeholder
//! columns are ignored.

use std::path::Path;

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer};

use enops_core::calendar::CalendarFeatures;
use enops_core::schema::{ForecastTable, TIMESTAMP_FORMAT};

use crate::error::{ForecastError, ForecastResult};
use crate::generate::{DeltaRow, ForecastRow, ForecastTables};
use crate::output::OutputFiles;

fn deserialize_datetime<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    NaiveDateTime::parse_from_str(raw.trim(), TIMESTAMP_FORMAT).map_err(serde::de::Error::custom)
}

#[derive(Debug, Deserialize)]
struct ForecastRecord {
    #[serde(deserialize_with = "deserialize_datetime")]
    datetime: NaiveDateTime,
    region: String,
    forecast_price: f64,
    forecast_demand: f64,
}

#[derive(Debug, Deserialize)]
struct DeltaRecord {
    #[serde(deserialize_with = "deserialize_datetime")]
    datetime: NaiveDateTime,
    region: String,
    delta_price: f64,
    delta_demand: f64,
}

fn open(path: &Path, table: ForecastTable) -> ForecastResult<csv::Reader<std::fs::File>> {
    if !path.is_file() {
        return Err(ForecastError::MissingOutputs(vec![table
            .file_name()
            .to_string()]));
    }
    Ok(csv::Reader::from_path(path)?)
}

pub fn read_forecast_csv(path: &Path, table: ForecastTable) -> ForecastResult<Vec<ForecastRow>> {
    let mut reader = open(path, table)?;
    reader
        .deserialize::<ForecastRecord>()
        .map(|record| {
            let record = record?;
            Ok(ForecastRow {
                features: CalendarFeatures::from_timestamp(record.datetime),
                datetime: record.datetime,
                region: record.region,
                forecast_price: record.forecast_price,
                forecast_demand: record.forecast_demand,
            })
        })
        .collect()
}

pub fn read_delta_csv(path: &Path) -> ForecastResult<Vec<DeltaRow>> {
    let mut reader = open(path, ForecastTable::Delta)?;
    reader
        .deserialize::<DeltaRecord>()
        .map(|record| {
            let record = record?;
            Ok(DeltaRow {
                datetime: record.datetime,
                region: record.region,
                delta_price: record.delta_price,
                delta_demand: record.delta_demand,
            })
        })
        .collect()
}

/// Load all three tables from `dir`.
pub fn load_forecast_tables(dir: &Path) -> ForecastResult<ForecastTables> {
    let files = OutputFiles::in_dir(dir);
    Ok(ForecastTables {
        baseline: read_forecast_csv(&files.baseline, ForecastTable::Baseline)?,
        shock: read_forecast_csv(&files.shock, ForecastTable::Shock)?,
        delta: read_delta_csv(&files.delta)?,
    })
}
