//! Applying a what-if scenario to the baseline forecast.
//!
//! **Algorithm** (per baseline row of the scenario's region):
//! ```text
//! what_if_price  = price  * price_multiplier * N(1, 0.1 * (volatility - 1))
//! what_if_demand = demand * demand_multiplier
//! ```
//! The noise generator is seeded from the scenario, so the same scenario over
//! the same baseline always gives the same table.

use std::fs::File;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDateTime;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use serde::Serialize;
use tracing::info;

use enops_core::schema::TIMESTAMP_FORMAT;
use enops_forecast::ForecastRow;

use crate::risk::RiskLevel;
use crate::spec::ResolvedWhatIf;
use crate::stats;

/// Hours per half-hour interval.
pub const INTERVAL_HOURS: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WhatIfRow {
    #[serde(serialize_with = "serialize_datetime")]
    pub datetime: NaiveDateTime,
    pub region: String,
    pub forecast_price: f64,
    pub forecast_demand: f64,
    pub what_if_price: f64,
    pub what_if_demand: f64,
    pub price_delta: f64,
    pub demand_delta: f64,
}

fn serialize_datetime<S: serde::Serializer>(
    value: &NaiveDateTime,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&value.format(TIMESTAMP_FORMAT))
}

pub fn apply_what_if(baseline: &[ForecastRow], scenario: &ResolvedWhatIf) -> Result<Vec<WhatIfRow>> {
    scenario.validate()?;
    let selected: Vec<&ForecastRow> = baseline
        .iter()
        .filter(|row| {
            scenario
                .region
                .as_deref()
                .map_or(true, |region| row.region == region)
        })
        .collect();
    if selected.is_empty() {
        return Err(anyhow!(
            "scenario '{}': no baseline rows for region {}",
            scenario.scenario_id,
            scenario.region.as_deref().unwrap_or("<any>")
        ));
    }

    let noise = Normal::new(1.0, 0.1 * (scenario.volatility_multiplier - 1.0))
        .map_err(|err| anyhow!("scenario '{}': {}", scenario.scenario_id, err))?;
    let mut rng = StdRng::seed_from_u64(scenario.seed);

    Ok(selected
        .into_iter()
        .map(|row| {
            let what_if_price =
                row.forecast_price * scenario.price_multiplier * noise.sample(&mut rng);
            let what_if_demand = row.forecast_demand * scenario.demand_multiplier;
            WhatIfRow {
                datetime: row.datetime,
                region: row.region.clone(),
                forecast_price: row.forecast_price,
                forecast_demand: row.forecast_demand,
                what_if_price,
                what_if_demand,
                price_delta: what_if_price - row.forecast_price,
                demand_delta: what_if_demand - row.forecast_demand,
            }
        })
        .collect())
}

/// Headline numbers for one applied scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WhatIfSummary {
    pub scenario_id: String,
    pub rows: usize,
    pub price_impact_pct: Option<f64>,
    pub demand_impact_pct: Option<f64>,
    pub mean_price_delta: f64,
    pub max_price_delta: f64,
    pub min_price_delta: f64,
    /// Sum of price deltas times portfolio size times interval length.
    pub financial_impact: f64,
    pub avg_hourly_impact: f64,
    pub risk_level: RiskLevel,
}

impl WhatIfSummary {
    pub fn from_rows(scenario: &ResolvedWhatIf, rows: &[WhatIfRow]) -> Result<Self> {
        let column = |f: fn(&WhatIfRow) -> f64| rows.iter().map(f).collect::<Vec<_>>();
        let base_price = column(|r| r.forecast_price);
        let what_if_price = column(|r| r.what_if_price);
        let base_demand = column(|r| r.forecast_demand);
        let what_if_demand = column(|r| r.what_if_demand);
        let price_delta = column(|r| r.price_delta);

        let empty = || anyhow!("scenario '{}' produced no rows", scenario.scenario_id);
        let impact = |new: &[f64], old: &[f64]| -> Result<Option<f64>> {
            let new = stats::mean(new).ok_or_else(empty)?;
            let old = stats::mean(old).ok_or_else(empty)?;
            Ok(stats::pct_change(new, old))
        };
        let price_impact_pct = impact(&what_if_price, &base_price)?;
        let demand_impact_pct = impact(&what_if_demand, &base_demand)?;

        let financial_impact =
            price_delta.iter().sum::<f64>() * scenario.portfolio_mw * INTERVAL_HOURS;
        Ok(Self {
            scenario_id: scenario.scenario_id.clone(),
            rows: rows.len(),
            price_impact_pct,
            demand_impact_pct,
            mean_price_delta: stats::mean(&price_delta).ok_or_else(empty)?,
            max_price_delta: stats::max(&price_delta).ok_or_else(empty)?,
            min_price_delta: stats::min(&price_delta).ok_or_else(empty)?,
            financial_impact,
            avg_hourly_impact: financial_impact / (rows.len() as f64 * INTERVAL_HOURS),
            risk_level: RiskLevel::from_price_impact(price_impact_pct.unwrap_or(0.0)),
        })
    }
}

#[derive(Debug, Clone)]
pub struct WhatIfOutcome {
    pub scenario: ResolvedWhatIf,
    pub rows: Vec<WhatIfRow>,
    pub summary: WhatIfSummary,
}

/// Apply every scenario in turn.
pub fn run_what_ifs(
    baseline: &[ForecastRow],
    scenarios: &[ResolvedWhatIf],
) -> Result<Vec<WhatIfOutcome>> {
    scenarios
        .iter()
        .map(|scenario| {
            let rows = apply_what_if(baseline, scenario)?;
            let summary = WhatIfSummary::from_rows(scenario, &rows)?;
            info!(
                "scenario '{}': {} rows, financial impact {:.0}",
                scenario.scenario_id, summary.rows, summary.financial_impact
            );
            Ok(WhatIfOutcome {
                scenario: scenario.clone(),
                rows,
                summary,
            })
        })
        .collect()
}

pub fn write_what_if_csv(path: &Path, rows: &[WhatIfRow]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = csv::Writer::from_writer(file);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
