//! # enops-forecast: synthetic 7-day energy market forecast
//!
//! Reads a historical market table, then writes three row-aligned CSV tables
//! for every region it finds:
//!
//! | file | content |
//! |------|---------|
//! | `forecast_baseline.csv` | expected price and demand per half hour |
//! | `forecast_scenario_shock.csv` | the baseline under a supply shock |
//! | `forecast_scenario_delta.csv` | shock minus baseline |
//!
//! ## Quick start
//!
//! ```no_run
//! use enops_forecast::{run_operational_forecast, ForecastOptions};
//!
//! let report = run_operational_forecast(&ForecastOptions {
//!     seed: Some(42),
//!     ..ForecastOptions::default()
//! })?;
//! println!("{} ({} rows per table)", report.message(), report.rows_per_table);
//! # Ok::<(), enops_forecast::ForecastError>(())
//! ```
//!
//! ## Modules
//!
//! - [`history`] - reading `.csv`/`.parquet` input and per-region means
//! - [`timestamps`] - timestamp column lookup and coercion
//! - [`grid`] - the fixed forecast horizon
//! - [`model`] - hour, weekend and shock multipliers
//! - [`generate`] - baseline, shock and delta rows
//! - [`output`] / [`tables`] - writing and reading the CSVs
//! - [`checks`] - scheduler input/output checks
//! - [`pipeline`] - the full run

pub mod checks;
pub mod error;
pub mod generate;
pub mod grid;
pub mod history;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod tables;
pub mod timestamps;

pub use checks::{check_outputs, validate_input, InputCheck, DEFAULT_MAX_INPUT_AGE};
pub use error::{ForecastError, ForecastResult};
pub use generate::{
    generate_baseline, generate_delta, generate_shock, DeltaRow, ForecastRow, ForecastTables,
};
pub use grid::{ForecastGrid, HORIZON_STEPS, INTERVAL_MINUTES};
pub use history::{load_history, HistoricalTable, RegionHistory};
pub use model::{ForecastModel, ShockModel};
pub use output::{write_forecast_tables, OutputFiles};
pub use pipeline::{
    build_forecast, run_operational_forecast, ForecastOptions, ForecastReport, DEFAULT_INPUT,
    DEFAULT_OUTPUT_DIR,
};
pub use tables::load_forecast_tables;
pub use timestamps::resolve_timestamp_column;
