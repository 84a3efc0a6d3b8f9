//! Regional risk matrix: how hard the shock scenario hits each region.

use std::fmt;

use serde::Serialize;

use enops_forecast::ForecastTables;

use crate::metrics::{region_order, values};
use crate::stats;

/// Position of a region on the price-impact / demand-impact plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskQuadrant {
    /// Price and demand both rise.
    HighRisk,
    MixedPriceDown,
    MixedPriceUp,
    LowRisk,
}

impl RiskQuadrant {
    pub fn classify(price_impact_pct: f64, demand_impact_pct: f64) -> Self {
        match (price_impact_pct >= 0.0, demand_impact_pct >= 0.0) {
            (true, true) => RiskQuadrant::HighRisk,
            (false, true) => RiskQuadrant::MixedPriceDown,
            (true, false) => RiskQuadrant::MixedPriceUp,
            (false, false) => RiskQuadrant::LowRisk,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskQuadrant::HighRisk => "high_risk",
            RiskQuadrant::MixedPriceDown => "mixed_price_down",
            RiskQuadrant::MixedPriceUp => "mixed_price_up",
            RiskQuadrant::LowRisk => "low_risk",
        }
    }
}

impl fmt::Display for RiskQuadrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

impl RiskLevel {
    /// Bucket a combined score: above 30 is high, above 15 medium.
    pub fn from_score(score: f64) -> Self {
        if score > 30.0 {
            RiskLevel::High
        } else if score > 15.0 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn from_impacts(price_impact_pct: f64, demand_impact_pct: f64) -> Self {
        Self::from_score(price_impact_pct.abs() + demand_impact_pct.abs())
    }

    pub fn from_price_impact(price_impact_pct: f64) -> Self {
        Self::from_score(price_impact_pct.abs())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::High => "high",
            RiskLevel::Medium => "medium",
            RiskLevel::Low => "low",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionRisk {
    pub region: String,
    /// Sample standard deviation of the shock price.
    pub price_volatility: Option<f64>,
    pub price_impact_pct: Option<f64>,
    pub demand_impact_pct: Option<f64>,
    /// Highest shock price minus highest baseline price.
    pub max_price_spike: f64,
    pub quadrant: RiskQuadrant,
    pub risk_level: RiskLevel,
}

/// One entry per region, in baseline order. Regions missing from the shock
/// table are skipped.
pub fn risk_matrix(tables: &ForecastTables) -> Vec<RegionRisk> {
    let mut matrix = Vec::new();
    for region in region_order(&tables.baseline) {
        let base_price = values(&tables.baseline, &region, |r| r.forecast_price);
        let shock_price = values(&tables.shock, &region, |r| r.forecast_price);
        let base_demand = values(&tables.baseline, &region, |r| r.forecast_demand);
        let shock_demand = values(&tables.shock, &region, |r| r.forecast_demand);
        if shock_price.is_empty() {
            continue;
        }

        let impact = |new: &[f64], old: &[f64]| {
            stats::mean(new)
                .zip(stats::mean(old))
                .and_then(|(n, o)| stats::pct_change(n, o))
        };
        let price_impact_pct = impact(&shock_price, &base_price);
        let demand_impact_pct = impact(&shock_demand, &base_demand);
        let max_price_spike = stats::max(&shock_price).unwrap_or(0.0)
            - stats::max(&base_price).unwrap_or(0.0);

        let (p, d) = (
            price_impact_pct.unwrap_or(0.0),
            demand_impact_pct.unwrap_or(0.0),
        );
        matrix.push(RegionRisk {
            price_volatility: stats::sample_std(&shock_price),
            price_impact_pct,
            demand_impact_pct,
            max_price_spike,
            quadrant: RiskQuadrant::classify(p, d),
            risk_level: RiskLevel::from_impacts(p, d),
            region,
        });
    }
    matrix
}
