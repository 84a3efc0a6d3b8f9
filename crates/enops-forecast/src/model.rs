//! Multipliers and noise levels of the synthetic forecast.
//!
//! **Baseline** (per row):
//! ```text
//! price  = max(0, base_price  * hour_mult(h) * weekend_mult * N(1, price_noise_sd))
//! demand = max(0, base_demand * hour_mult(h) * weekend_mult * N(1, demand_noise_sd))
//! ```
//! `base_*` is the region's historical mean when one exists, else the model default.
//!
//! **Shock** (per baseline row):
//! ```text
//! price  = max(0, price  * N(1.3, 0.1) * [peak rows: U(1.5, 2.5)])
//! demand = max(0, demand * N(1.15, 0.05))
//! ```

use enops_core::calendar::{hour_in, is_peak_hour};

use crate::error::{ForecastError, ForecastResult};

pub const DEFAULT_BASE_PRICE: f64 = 50.0;
pub const DEFAULT_BASE_DEMAND: f64 = 7000.0;

const PEAK_PRICE_MULTIPLIER: f64 = 1.4;
const OFF_PEAK_PRICE_MULTIPLIER: f64 = 0.7;
/// Written as a single closed window whose start is after its end, so it
/// never matches and off-peak hours price at the 1.0 rate.
const PRICE_OFF_PEAK_WINDOW: (u32, u32) = (22, 6);

const PEAK_DEMAND_MULTIPLIER: f64 = 1.3;
const LOW_DEMAND_MULTIPLIER: f64 = 0.6;
const LOW_DEMAND_WINDOW: (u32, u32) = (1, 5);

pub fn price_hour_multiplier(hour: u32) -> f64 {
    if is_peak_hour(hour) {
        PEAK_PRICE_MULTIPLIER
    } else if hour_in(hour, PRICE_OFF_PEAK_WINDOW) {
        OFF_PEAK_PRICE_MULTIPLIER
    } else {
        1.0
    }
}

pub fn demand_hour_multiplier(hour: u32) -> f64 {
    if is_peak_hour(hour) {
        PEAK_DEMAND_MULTIPLIER
    } else if hour_in(hour, LOW_DEMAND_WINDOW) {
        LOW_DEMAND_MULTIPLIER
    } else {
        1.0
    }
}

/// Perturbation applied on top of the baseline to build the shock scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct ShockModel {
    pub price_mean: f64,
    pub price_sd: f64,
    pub demand_mean: f64,
    pub demand_sd: f64,
    /// Extra uniform spike drawn for peak-period rows, `[low, high)`.
    pub peak_spike: (f64, f64),
}

impl Default for ShockModel {
    fn default() -> Self {
        Self {
            price_mean: 1.3,
            price_sd: 0.1,
            demand_mean: 1.15,
            demand_sd: 0.05,
            peak_spike: (1.5, 2.5),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastModel {
    pub default_base_price: f64,
    pub default_base_demand: f64,
    pub price_weekend_multiplier: f64,
    pub demand_weekend_multiplier: f64,
    pub price_noise_sd: f64,
    pub demand_noise_sd: f64,
    pub shock: ShockModel,
}

impl Default for ForecastModel {
    fn default() -> Self {
        Self {
            default_base_price: DEFAULT_BASE_PRICE,
            default_base_demand: DEFAULT_BASE_DEMAND,
            price_weekend_multiplier: 0.8,
            demand_weekend_multiplier: 0.85,
            price_noise_sd: 0.1,
            demand_noise_sd: 0.05,
            shock: ShockModel::default(),
        }
    }
}

impl ForecastModel {
    /// A model with every noise term switched off. Shock factors collapse to
    /// their means and the peak spike to its lower bound.
    pub fn deterministic() -> Self {
        Self {
            price_noise_sd: 0.0,
            demand_noise_sd: 0.0,
            shock: ShockModel {
                price_sd: 0.0,
                demand_sd: 0.0,
                peak_spike: (1.5, 1.5),
                ..ShockModel::default()
            },
            ..Self::default()
        }
    }

    pub fn validate(&self) -> ForecastResult<()> {
        let sds = [
            ("price_noise_sd", self.price_noise_sd),
            ("demand_noise_sd", self.demand_noise_sd),
            ("shock.price_sd", self.shock.price_sd),
            ("shock.demand_sd", self.shock.demand_sd),
        ];
        for (name, value) in sds {
            if !value.is_finite() || value < 0.0 {
                return Err(ForecastError::InvalidModel(format!(
                    "{name} must be a finite non-negative number, got {value}"
                )));
            }
        }
        let (low, high) = self.shock.peak_spike;
        if !low.is_finite() || !high.is_finite() || low > high {
            return Err(ForecastError::InvalidModel(format!(
                "peak spike range [{low}, {high}) is empty"
            )));
        }
        Ok(())
    }

    pub fn price_weekend(&self, is_weekend: bool) -> f64 {
        if is_weekend {
            self.price_weekend_multiplier
        } else {
            1.0
        }
    }

    pub fn demand_weekend(&self, is_weekend: bool) -> f64 {
        if is_weekend {
            self.demand_weekend_multiplier
        } else {
            1.0
        }
    }
}
