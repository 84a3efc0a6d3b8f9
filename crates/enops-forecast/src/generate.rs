//! Baseline, shock and delta table generation.
//!
//! All three tables are produced in the same row order: regions in the order
//! the history lists them, and within a region the grid timestamps ascending.
//! Row `i` of every table therefore refers to the same `(region, datetime)`.

use chrono::NaiveDateTime;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use tracing::info;

use enops_core::calendar::{CalendarFeatures, PeakPeriod};

use crate::error::{ForecastError, ForecastResult};
use crate::grid::ForecastGrid;
use crate::history::HistoricalTable;
use crate::model::{demand_hour_multiplier, price_hour_multiplier, ForecastModel};

/// One row of the baseline or shock table.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRow {
    pub datetime: NaiveDateTime,
    pub region: String,
    pub features: CalendarFeatures,
    pub forecast_price: f64,
    pub forecast_demand: f64,
}

/// One row of the delta table: shock minus baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct DeltaRow {
    pub datetime: NaiveDateTime,
    pub region: String,
    pub delta_price: f64,
    pub delta_demand: f64,
}

/// The three row-aligned output tables of one run.
#[derive(Debug, Clone, Default)]
pub struct ForecastTables {
    pub baseline: Vec<ForecastRow>,
    pub shock: Vec<ForecastRow>,
    pub delta: Vec<DeltaRow>,
}

impl ForecastTables {
    /// Rows in each table; the three tables always have the same height.
    pub fn rows(&self) -> usize {
        self.baseline.len()
    }

    /// Build all three tables for every region of `history` over `grid`.
    pub fn generate<R: Rng + ?Sized>(
        history: &HistoricalTable,
        grid: &ForecastGrid,
        model: &ForecastModel,
        rng: &mut R,
    ) -> ForecastResult<Self> {
        model.validate()?;
        let baseline = generate_baseline(history, grid, model, rng)?;
        let shock = generate_shock(&baseline, model, rng)?;
        let delta = generate_delta(&baseline, &shock)?;
        Ok(Self {
            baseline,
            shock,
            delta,
        })
    }
}

fn normal(mean: f64, sd: f64) -> ForecastResult<Normal<f64>> {
    Normal::new(mean, sd).map_err(|err| {
        ForecastError::InvalidModel(format!("normal distribution N({mean}, {sd}): {err}"))
    })
}

pub fn generate_baseline<R: Rng + ?Sized>(
    history: &HistoricalTable,
    grid: &ForecastGrid,
    model: &ForecastModel,
    rng: &mut R,
) -> ForecastResult<Vec<ForecastRow>> {
    info!("Generating baseline forecast...");
    let price_noise = normal(1.0, model.price_noise_sd)?;
    let demand_noise = normal(1.0, model.demand_noise_sd)?;

    let mut rows = Vec::with_capacity(history.regions.len() * grid.len());
    for region in &history.regions {
        let base_price = region.mean_price.unwrap_or(model.default_base_price);
        let base_demand = region.mean_demand.unwrap_or(model.default_base_demand);

        for datetime in grid.iter() {
            let features = CalendarFeatures::from_timestamp(*datetime);
            let price = base_price
                * price_hour_multiplier(features.hour)
                * model.price_weekend(features.is_weekend)
                * price_noise.sample(rng);
            let demand = base_demand
                * demand_hour_multiplier(features.hour)
                * model.demand_weekend(features.is_weekend)
                * demand_noise.sample(rng);

            rows.push(ForecastRow {
                datetime: *datetime,
                region: region.region.clone(),
                features,
                forecast_price: price.max(0.0),
                forecast_demand: demand.max(0.0),
            });
        }
    }
    Ok(rows)
}

/// Perturb a baseline into the shock scenario.
///
/// Draw order matches a vectorised implementation: all price factors, then
/// all demand factors, then one spike per peak row in row order.
pub fn generate_shock<R: Rng + ?Sized>(
    baseline: &[ForecastRow],
    model: &ForecastModel,
    rng: &mut R,
) -> ForecastResult<Vec<ForecastRow>> {
    info!("Generating scenario shock forecast...");
    let shock = &model.shock;
    let price_factor = normal(shock.price_mean, shock.price_sd)?;
    let demand_factor = normal(shock.demand_mean, shock.demand_sd)?;

    let mut rows = baseline.to_vec();
    for row in rows.iter_mut() {
        row.forecast_price *= price_factor.sample(rng);
    }
    for row in rows.iter_mut() {
        row.forecast_demand *= demand_factor.sample(rng);
    }

    let (low, high) = shock.peak_spike;
    for row in rows
        .iter_mut()
        .filter(|r| r.features.peak_period == PeakPeriod::Peak)
    {
        let spike = if low < high {
            rng.gen_range(low..high)
        } else {
            low
        };
        row.forecast_price *= spike;
    }

    for row in rows.iter_mut() {
        row.forecast_price = row.forecast_price.max(0.0);
        row.forecast_demand = row.forecast_demand.max(0.0);
    }
    Ok(rows)
}

pub fn generate_delta(
    baseline: &[ForecastRow],
    shock: &[ForecastRow],
) -> ForecastResult<Vec<DeltaRow>> {
    info!("Generating scenario delta forecast...");
    if baseline.len() != shock.len() {
        return Err(ForecastError::Misaligned {
            left: "baseline",
            right: "shock",
            row: baseline.len().min(shock.len()),
        });
    }
    baseline
        .iter()
        .zip(shock)
        .enumerate()
        .map(|(row, (base, shocked))| {
            if base.datetime != shocked.datetime || base.region != shocked.region {
                return Err(ForecastError::Misaligned {
                    left: "baseline",
                    right: "shock",
                    row,
                });
            }
            Ok(DeltaRow {
                datetime: base.datetime,
                region: base.region.clone(),
                delta_price: shocked.forecast_price - base.forecast_price,
                delta_demand: shocked.forecast_demand - base.forecast_demand,
            })
        })
        .collect()
}
