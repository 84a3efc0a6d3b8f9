//! The end-to-end forecast run.
//!
//! **Algorithm:**
//! 1. Read the history and summarise it per region ([`load_history`]).
//! 2. Lay out the 7-day, 30-minute grid after the latest observation.
//! 3. Generate baseline, shock and delta rows ([`ForecastTables::generate`]).
//! 4. Write the three CSVs ([`write_forecast_tables`]).
//!
//! The history is read before anything touches the output directory, so a
//! missing or malformed input leaves no files behind.

use std::path::PathBuf;

use chrono::NaiveDateTime;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, info};

use enops_core::schema::DEFAULT_REGION;

use crate::error::ForecastResult;
use crate::generate::ForecastTables;
use crate::grid::ForecastGrid;
use crate::history::load_history;
use crate::model::ForecastModel;
use crate::output::{write_forecast_tables, OutputFiles};

pub const DEFAULT_INPUT: &str = "fact_energy_market.parquet";
pub const DEFAULT_OUTPUT_DIR: &str = "data";

#[derive(Debug, Clone)]
pub struct ForecastOptions {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    /// `None` seeds from OS entropy so reruns differ.
    pub seed: Option<u64>,
    /// Region used when the history has no region column.
    pub default_region: String,
    pub model: ForecastModel,
}

impl Default for ForecastOptions {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            seed: None,
            default_region: DEFAULT_REGION.to_string(),
            model: ForecastModel::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ForecastReport {
    pub regions: Vec<String>,
    pub rows_per_table: usize,
    pub horizon_start: NaiveDateTime,
    pub horizon_end: NaiveDateTime,
    pub baseline: PathBuf,
    pub shock: PathBuf,
    pub delta: PathBuf,
    pub seed: Option<u64>,
}

impl ForecastReport {
    pub fn message(&self) -> &'static str {
        "Forecast generation completed successfully"
    }

    pub fn files(&self) -> OutputFiles {
        OutputFiles {
            baseline: self.baseline.clone(),
            shock: self.shock.clone(),
            delta: self.delta.clone(),
        }
    }
}

/// Generate the tables in memory without writing anything.
pub fn build_forecast(
    options: &ForecastOptions,
) -> ForecastResult<(ForecastGrid, Vec<String>, ForecastTables)> {
    options.model.validate()?;
    info!("Loading historical data from {}", options.input.display());
    let history = load_history(&options.input, &options.default_region)?;
    let regions = history.region_names();
    info!(
        "Loaded {} rows covering {} region(s); last observation {}",
        history.rows,
        regions.len(),
        history.last_timestamp
    );

    let grid = ForecastGrid::after(history.last_timestamp);
    debug!("forecast horizon {} .. {}", grid.start(), grid.end());

    let mut rng = options
        .seed
        .map(StdRng::seed_from_u64)
        .unwrap_or_else(StdRng::from_entropy);
    let tables = ForecastTables::generate(&history, &grid, &options.model, &mut rng)?;
    Ok((grid, regions, tables))
}

/// Run the whole forecast and write the three tables.
pub fn run_operational_forecast(options: &ForecastOptions) -> ForecastResult<ForecastReport> {
    let (grid, regions, tables) = build_forecast(options)?;
    let files = write_forecast_tables(&options.output_dir, &tables)?;

    let report = ForecastReport {
        regions,
        rows_per_table: tables.rows(),
        horizon_start: grid.start(),
        horizon_end: grid.end(),
        baseline: files.baseline,
        shock: files.shock,
        delta: files.delta,
        seed: options.seed,
    };
    info!("{}", report.message());
    Ok(report)
}
