//! # enops-core: shared vocabulary for the energy ops forecast
//!
//! Everything in this crate is pure data: no I/O, no randomness. The forecast
//! generator, the scenario analytics and the CLI all agree on
//!
//! - how a half-hourly timestamp is turned into calendar features
//!   ([`CalendarFeatures`], [`PeakPeriod`]),
//! - what the three output tables are called and which columns they carry
//!   ([`ForecastTable`], [`schema`]).
//!
//! ## Modules
//!
//! - [`calendar`] - hour-of-day / weekend / peak-period classification
//! - [`schema`] - output file names, column names and timestamp layout

pub mod calendar;
pub mod schema;

pub use calendar::{hour_in, is_peak_hour, CalendarFeatures, PeakPeriod, PEAK_WINDOWS};
pub use schema::{ForecastTable, DEFAULT_REGION, TIMESTAMP_FORMAT};
