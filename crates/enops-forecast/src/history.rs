//! Reading the historical market table and summarising it per region.
//!
//! The history only seeds the forecast: it fixes the start of the horizon (its
//! latest timestamp) and the per-region mean price/demand. Everything else in
//! the file is ignored.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use chrono::NaiveDateTime;
use polars::prelude::*;
#[cfg(feature = "parquet")]
use polars::prelude::ParquetReader;
use tracing::debug;

use enops_core::schema::{COL_DATETIME, COL_FORECAST_DEMAND, COL_FORECAST_PRICE};

use crate::error::{ForecastError, ForecastResult};
use crate::timestamps::{coerce_timestamps, resolve_timestamp_column};

/// Columns accepted as the region identifier, in priority order.
pub const REGION_CANDIDATES: [&str; 2] = ["region", "regionid"];

/// Per-region seed values taken from the history.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionHistory {
    pub region: String,
    pub rows: usize,
    /// Mean of the non-null historical `forecast_price` values, if any.
    pub mean_price: Option<f64>,
    /// Mean of the non-null historical `forecast_demand` values, if any.
    pub mean_demand: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct HistoricalTable {
    /// Name of the column the timestamps were read from.
    pub timestamp_column: String,
    pub rows: usize,
    pub first_timestamp: NaiveDateTime,
    pub last_timestamp: NaiveDateTime,
    /// Regions in order of first appearance.
    pub regions: Vec<RegionHistory>,
}

impl HistoricalTable {
    pub fn region_names(&self) -> Vec<String> {
        self.regions.iter().map(|r| r.region.clone()).collect()
    }

    /// Summarise a frame that has already been read from disk.
    ///
    /// When the frame has no region column, or the column holds only nulls,
    /// every row is attributed to `default_region`.
    pub fn from_frame(df: &DataFrame, default_region: &str) -> ForecastResult<Self> {
        let names = df.get_column_names();
        let timestamp_column = resolve_timestamp_column(&names)?.to_string();
        if timestamp_column != COL_DATETIME {
            debug!(
                "using column '{}' as the timestamp column",
                timestamp_column
            );
        }

        let timestamps = coerce_timestamps(df.column(&timestamp_column)?)?;
        let (first_timestamp, last_timestamp) = timestamps
            .iter()
            .flatten()
            .fold(None, |acc: Option<(NaiveDateTime, NaiveDateTime)>, ts| {
                Some(match acc {
                    None => (*ts, *ts),
                    Some((lo, hi)) => (lo.min(*ts), hi.max(*ts)),
                })
            })
            .ok_or_else(|| {
                ForecastError::DataFormat(format!(
                    "column '{timestamp_column}' contains no timestamps"
                ))
            })?;

        let regions = region_values(df, &names)?;
        let prices = numeric_column(df, &names, COL_FORECAST_PRICE)?;
        let demands = numeric_column(df, &names, COL_FORECAST_DEMAND)?;

        let mut order: Vec<String> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut stats: Vec<RegionStats> = Vec::new();

        for row in 0..df.height() {
            let region = match &regions {
                Some(values) => match &values[row] {
                    Some(name) => name.as_str(),
                    None => continue,
                },
                None => default_region,
            };
            let slot = match index.get(region) {
                Some(slot) => *slot,
                None => {
                    order.push(region.to_string());
                    stats.push(RegionStats::default());
                    index.insert(region.to_string(), stats.len() - 1);
                    stats.len() - 1
                }
            };
            let entry = &mut stats[slot];
            entry.rows += 1;
            if let Some(value) = prices.as_ref().and_then(|p| p[row]) {
                entry.price.push(value);
            }
            if let Some(value) = demands.as_ref().and_then(|d| d[row]) {
                entry.demand.push(value);
            }
        }

        let regions = order
            .into_iter()
            .zip(stats)
            .map(|(region, s)| RegionHistory {
                region,
                rows: s.rows,
                mean_price: s.price.mean(),
                mean_demand: s.demand.mean(),
            })
            .collect();

        Ok(Self {
            timestamp_column,
            rows: df.height(),
            first_timestamp,
            last_timestamp,
            regions,
        })
    }
}

#[derive(Default)]
struct RegionStats {
    rows: usize,
    price: RunningMean,
    demand: RunningMean,
}

#[derive(Default)]
struct RunningMean {
    sum: f64,
    count: usize,
}

impl RunningMean {
    fn push(&mut self, value: f64) {
        if value.is_nan() {
            return;
        }
        self.sum += value;
        self.count += 1;
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Read the history file and summarise it.
pub fn load_history(path: &Path, default_region: &str) -> ForecastResult<HistoricalTable> {
    let df = read_frame(path)?;
    debug!(
        "read {} rows x {} columns from {}",
        df.height(),
        df.width(),
        path.display()
    );
    HistoricalTable::from_frame(&df, default_region)
}

/// Read a `.csv` or `.parquet` file into a frame.
pub fn read_frame(path: &Path) -> ForecastResult<DataFrame> {
    if !path.is_file() {
        return Err(ForecastError::InputNotFound(path.to_path_buf()));
    }
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();
    let unreadable = |message: String| ForecastError::InputUnreadable {
        path: path.to_path_buf(),
        message,
    };
    let mut file = File::open(path).map_err(|err| unreadable(err.to_string()))?;

    match extension.as_str() {
        #[cfg(feature = "parquet")]
        "parquet" => ParquetReader::new(&mut file)
            .finish()
            .map_err(|err| unreadable(err.to_string())),
        #[cfg(not(feature = "parquet"))]
        "parquet" => Err(ForecastError::DataFormat(
            "parquet support is disabled; rebuild with the 'parquet' feature".to_string(),
        )),
        "csv" => CsvReader::new(&mut file)
            .has_header(true)
            .finish()
            .map_err(|err| unreadable(err.to_string())),
        _ => Err(ForecastError::DataFormat(format!(
            "unsupported file extension '{}'; use .csv or .parquet",
            extension
        ))),
    }
}

fn find_column<'a>(names: &[&'a str], candidates: &[&str]) -> Option<&'a str> {
    candidates.iter().find_map(|candidate| {
        names
            .iter()
            .find(|name| name.eq_ignore_ascii_case(candidate))
            .copied()
    })
}

fn region_values(df: &DataFrame, names: &[&str]) -> ForecastResult<Option<Vec<Option<String>>>> {
    let Some(column) = find_column(names, &REGION_CANDIDATES) else {
        return Ok(None);
    };
    let series = df.column(column)?.cast(&DataType::Utf8)?;
    let values: Vec<Option<String>> = series
        .utf8()?
        .into_iter()
        .map(|v| v.map(str::trim).filter(|v| !v.is_empty()).map(String::from))
        .collect();
    if values.iter().all(Option::is_none) {
        debug!("region column '{}' holds no values; using the default region", column);
        return Ok(None);
    }
    Ok(Some(values))
}

fn numeric_column(
    df: &DataFrame,
    names: &[&str],
    name: &str,
) -> ForecastResult<Option<Vec<Option<f64>>>> {
    let Some(column) = find_column(names, &[name]) else {
        return Ok(None);
    };
    let series = df.column(column)?.cast(&DataType::Float64)?;
    Ok(Some(series.f64()?.into_iter().collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(columns: Vec<Series>) -> DataFrame {
        DataFrame::new(columns).unwrap()
    }

    #[test]
    fn test_regions_keep_first_appearance_order() {
        let df = frame(vec![
            Series::new(
                "datetime",
                &[
                    "2024-01-01 00:00:00",
                    "2024-01-01 00:00:00",
                    "2023-12-31 23:30:00",
                ],
            ),
            Series::new("region", &["VIC1", "NSW1", "VIC1"]),
            Series::new("forecast_price", &[Some(40.0), Some(60.0), None]),
        ]);
        let table = HistoricalTable::from_frame(&df, "NSW1").unwrap();
        assert_eq!(table.region_names(), vec!["VIC1", "NSW1"]);
        assert_eq!(table.regions[0].rows, 2);
        assert_eq!(table.regions[0].mean_price, Some(40.0));
        assert_eq!(table.regions[1].mean_price, Some(60.0));
        assert_eq!(table.regions[0].mean_demand, None);
        assert_eq!(table.last_timestamp.to_string(), "2024-01-01 00:00:00");
        assert_eq!(table.first_timestamp.to_string(), "2023-12-31 23:30:00");
    }

    #[test]
    fn test_missing_region_column_uses_default() {
        let df = frame(vec![
            Series::new("Timestamp", &["2024-01-01 00:00:00", "2024-01-01 00:30:00"]),
            Series::new("forecast_demand", &[6000.0, 8000.0]),
        ]);
        let table = HistoricalTable::from_frame(&df, "QLD1").unwrap();
        assert_eq!(table.timestamp_column, "Timestamp");
        assert_eq!(table.region_names(), vec!["QLD1"]);
        assert_eq!(table.regions[0].mean_demand, Some(7000.0));
    }

    #[test]
    fn test_null_only_region_column_uses_default() {
        let df = frame(vec![
            Series::new("datetime", &["2024-01-01 00:00:00"]),
            Series::new("region", &[None::<&str>]),
        ]);
        let table = HistoricalTable::from_frame(&df, "NSW1").unwrap();
        assert_eq!(table.region_names(), vec!["NSW1"]);
    }

    #[test]
    fn test_numeric_region_ids_become_strings() {
        let df = frame(vec![
            Series::new("datetime", &["2024-01-01 00:00:00", "2024-01-01 00:00:00"]),
            Series::new("region", &[1i64, 2]),
        ]);
        let table = HistoricalTable::from_frame(&df, "NSW1").unwrap();
        assert_eq!(table.region_names(), vec!["1", "2"]);
    }

    #[test]
    fn test_all_null_timestamps_is_data_format_error() {
        let df = frame(vec![Series::new("datetime", &[None::<&str>, None])]);
        let err = HistoricalTable::from_frame(&df, "NSW1").unwrap_err();
        assert!(matches!(err, ForecastError::DataFormat(_)));
    }

    #[cfg(feature = "parquet")]
    #[test]
    fn test_read_frame_corrupt_parquet_is_unreadable_input() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("history.parquet");
        std::fs::write(&path, b"this is not a parquet file").unwrap();
        let err = read_frame(&path).unwrap_err();
        assert!(
            matches!(err, ForecastError::InputUnreadable { .. }),
            "unexpected {err:?}"
        );
        assert!(err.is_input_error());
    }

    #[test]
    fn test_read_frame_missing_file() {
        let err = read_frame(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, ForecastError::InputNotFound(_)));
    }
}
