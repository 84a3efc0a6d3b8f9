//! Persisting the forecast tables as CSV files.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use polars::prelude::*;
use tracing::info;

use enops_core::schema::{
    ForecastTable, COL_DATETIME, COL_DAY_OF_WEEK, COL_DELTA_DEMAND, COL_DELTA_PRICE,
    COL_FORECAST_DEMAND, COL_FORECAST_PRICE, COL_HOUR, COL_IS_WEEKEND, COL_PEAK_PERIOD,
    COL_REGION, PLACEHOLDER_COLUMNS, TIMESTAMP_FORMAT,
};

use crate::error::{ForecastError, ForecastResult};
use crate::generate::{DeltaRow, ForecastRow, ForecastTables};

/// Paths of the three files written by one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFiles {
    pub baseline: PathBuf,
    pub shock: PathBuf,
    pub delta: PathBuf,
}

impl OutputFiles {
    /// Expected locations under `dir`, whether or not they exist yet.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            baseline: dir.join(ForecastTable::Baseline.file_name()),
            shock: dir.join(ForecastTable::Shock.file_name()),
            delta: dir.join(ForecastTable::Delta.file_name()),
        }
    }

    pub fn path(&self, table: ForecastTable) -> &Path {
        match table {
            ForecastTable::Baseline => &self.baseline,
            ForecastTable::Shock => &self.shock,
            ForecastTable::Delta => &self.delta,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (ForecastTable, &Path)> {
        ForecastTable::ALL.into_iter().map(move |t| (t, self.path(t)))
    }
}

fn format_datetimes<'a>(rows: impl Iterator<Item = &'a chrono::NaiveDateTime>) -> Vec<String> {
    rows.map(|dt| dt.format(TIMESTAMP_FORMAT).to_string())
        .collect()
}

/// Baseline/shock frame: calendar features, null placeholders, then values.
pub fn forecast_frame(rows: &[ForecastRow]) -> ForecastResult<DataFrame> {
    let height = rows.len();
    let mut columns = vec![
        Series::new(
            COL_DATETIME,
            format_datetimes(rows.iter().map(|r| &r.datetime)),
        ),
        Series::new(
            COL_HOUR,
            rows.iter()
                .map(|r| r.features.hour as i32)
                .collect::<Vec<_>>(),
        ),
        Series::new(
            COL_DAY_OF_WEEK,
            rows.iter()
                .map(|r| r.features.day_of_week as i32)
                .collect::<Vec<_>>(),
        ),
        Series::new(
            COL_IS_WEEKEND,
            rows.iter()
                .map(|r| r.features.weekend_flag())
                .collect::<Vec<_>>(),
        ),
        Series::new(
            COL_PEAK_PERIOD,
            rows.iter()
                .map(|r| r.features.peak_period.as_str())
                .collect::<Vec<_>>(),
        ),
    ];
    columns.extend(
        PLACEHOLDER_COLUMNS
            .iter()
            .map(|name| Series::full_null(name, height, &DataType::Float64)),
    );
    columns.push(Series::new(
        COL_REGION,
        rows.iter().map(|r| r.region.as_str()).collect::<Vec<_>>(),
    ));
    columns.push(Series::new(
        COL_FORECAST_PRICE,
        rows.iter().map(|r| r.forecast_price).collect::<Vec<_>>(),
    ));
    columns.push(Series::new(
        COL_FORECAST_DEMAND,
        rows.iter().map(|r| r.forecast_demand).collect::<Vec<_>>(),
    ));
    Ok(DataFrame::new(columns)?)
}

pub fn delta_frame(rows: &[DeltaRow]) -> ForecastResult<DataFrame> {
    Ok(DataFrame::new(vec![
        Series::new(
            COL_DATETIME,
            format_datetimes(rows.iter().map(|r| &r.datetime)),
        ),
        Series::new(
            COL_REGION,
            rows.iter().map(|r| r.region.as_str()).collect::<Vec<_>>(),
        ),
        Series::new(
            COL_DELTA_PRICE,
            rows.iter().map(|r| r.delta_price).collect::<Vec<_>>(),
        ),
        Series::new(
            COL_DELTA_DEMAND,
            rows.iter().map(|r| r.delta_demand).collect::<Vec<_>>(),
        ),
    ])?)
}

fn write_csv(path: &Path, df: &mut DataFrame) -> ForecastResult<()> {
    let output_error = |message: String| ForecastError::Output {
        path: path.to_path_buf(),
        message,
    };
    let mut file = File::create(path).map_err(|err| output_error(err.to_string()))?;
    CsvWriter::new(&mut file)
        .finish(df)
        .map_err(|err| output_error(err.to_string()))
}

/// Write the three tables under `dir`, creating it if needed. Existing files
/// are overwritten. A failure part-way leaves earlier files in place.
pub fn write_forecast_tables(dir: &Path, tables: &ForecastTables) -> ForecastResult<OutputFiles> {
    fs::create_dir_all(dir).map_err(|err| ForecastError::Output {
        path: dir.to_path_buf(),
        message: err.to_string(),
    })?;
    let files = OutputFiles::in_dir(dir);

    let mut baseline = forecast_frame(&tables.baseline)?;
    write_csv(&files.baseline, &mut baseline)?;
    info!("Saved baseline forecast to {}", files.baseline.display());

    let mut shock = forecast_frame(&tables.shock)?;
    write_csv(&files.shock, &mut shock)?;
    info!("Saved scenario shock forecast to {}", files.shock.display());

    let mut delta = delta_frame(&tables.delta)?;
    write_csv(&files.delta, &mut delta)?;
    info!("Saved scenario delta forecast to {}", files.delta.display());

    Ok(files)
}
