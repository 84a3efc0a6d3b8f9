//! Per-region comparison of the shock scenario against the baseline.

use anyhow::{anyhow, Result};
use serde::Serialize;

use enops_forecast::{ForecastRow, ForecastTables};

use crate::stats;
use crate::what_if::INTERVAL_HOURS;

/// Regions in order of first appearance.
pub(crate) fn region_order(rows: &[ForecastRow]) -> Vec<String> {
    let mut regions: Vec<String> = Vec::new();
    for row in rows {
        if !regions.iter().any(|r| *r == row.region) {
            regions.push(row.region.clone());
        }
    }
    regions
}

pub(crate) fn values(rows: &[ForecastRow], region: &str, f: fn(&ForecastRow) -> f64) -> Vec<f64> {
    rows.iter().filter(|r| r.region == region).map(f).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioMetrics {
    pub region: String,
    pub base_avg_price: f64,
    pub shock_avg_price: f64,
    pub base_avg_demand: f64,
    pub shock_avg_demand: f64,
    pub price_impact_pct: Option<f64>,
    pub demand_impact_pct: Option<f64>,
    pub base_price_volatility: Option<f64>,
    pub shock_price_volatility: Option<f64>,
    pub volatility_change_pct: Option<f64>,
    pub max_price_delta: f64,
    pub min_price_delta: f64,
    pub max_demand_delta: f64,
    pub min_demand_delta: f64,
    /// 95th percentile of baseline price.
    pub p95_base_price: f64,
    pub p95_shock_price: f64,
    pub p95_impact: f64,
    pub portfolio_mw: f64,
    /// Sum of price deltas times portfolio size times interval length.
    pub total_cost_impact: f64,
}

impl ScenarioMetrics {
    pub fn for_region(tables: &ForecastTables, region: &str, portfolio_mw: f64) -> Result<Self> {
        let base_price = values(&tables.baseline, region, |r| r.forecast_price);
        let shock_price = values(&tables.shock, region, |r| r.forecast_price);
        let base_demand = values(&tables.baseline, region, |r| r.forecast_demand);
        let shock_demand = values(&tables.shock, region, |r| r.forecast_demand);
        let (delta_price, delta_demand): (Vec<f64>, Vec<f64>) = tables
            .delta
            .iter()
            .filter(|r| r.region == region)
            .map(|r| (r.delta_price, r.delta_demand))
            .unzip();

        let missing = |table: &str| anyhow!("region '{}' has no rows in the {} table", region, table);
        let base_avg_price = stats::mean(&base_price).ok_or_else(|| missing("baseline"))?;
        let shock_avg_price = stats::mean(&shock_price).ok_or_else(|| missing("shock"))?;
        let base_avg_demand = stats::mean(&base_demand).ok_or_else(|| missing("baseline"))?;
        let shock_avg_demand = stats::mean(&shock_demand).ok_or_else(|| missing("shock"))?;
        let max_price_delta = stats::max(&delta_price).ok_or_else(|| missing("delta"))?;
        let min_price_delta = stats::min(&delta_price).ok_or_else(|| missing("delta"))?;
        let max_demand_delta = stats::max(&delta_demand).ok_or_else(|| missing("delta"))?;
        let min_demand_delta = stats::min(&delta_demand).ok_or_else(|| missing("delta"))?;
        let p95_base_price = stats::percentile(&base_price, 95.0).ok_or_else(|| missing("baseline"))?;
        let p95_shock_price = stats::percentile(&shock_price, 95.0).ok_or_else(|| missing("shock"))?;

        let base_price_volatility = stats::sample_std(&base_price);
        let shock_price_volatility = stats::sample_std(&shock_price);
        let volatility_change_pct = shock_price_volatility
            .zip(base_price_volatility)
            .and_then(|(shock, base)| stats::pct_change(shock, base));

        Ok(Self {
            region: region.to_string(),
            base_avg_price,
            shock_avg_price,
            base_avg_demand,
            shock_avg_demand,
            price_impact_pct: stats::pct_change(shock_avg_price, base_avg_price),
            demand_impact_pct: stats::pct_change(shock_avg_demand, base_avg_demand),
            base_price_volatility,
            shock_price_volatility,
            volatility_change_pct,
            max_price_delta,
            min_price_delta,
            max_demand_delta,
            min_demand_delta,
            p95_base_price,
            p95_shock_price,
            p95_impact: p95_shock_price - p95_base_price,
            portfolio_mw,
            total_cost_impact: delta_price.iter().sum::<f64>() * portfolio_mw * INTERVAL_HOURS,
        })
    }
}

/// Metrics for every region in the baseline.
pub fn all_region_metrics(tables: &ForecastTables, portfolio_mw: f64) -> Result<Vec<ScenarioMetrics>> {
    region_order(&tables.baseline)
        .iter()
        .map(|region| ScenarioMetrics::for_region(tables, region, portfolio_mw))
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{Duration, NaiveDateTime};
    use enops_core::calendar::CalendarFeatures;
    use enops_forecast::generate_delta;

    /// Build aligned tables from per-region prices and a flat demand level.
    pub(crate) fn tables_for(regions: &[(&str, Vec<f64>, Vec<f64>, f64, f64)]) -> ForecastTables {
        let start = NaiveDateTime::parse_from_str("2024-01-01 00:30:00", "%Y-%m-%d %H:%M:%S")
            .unwrap();
        let mut baseline = Vec::new();
        let mut shock = Vec::new();
        for (region, base_prices, shock_prices, base_demand, shock_demand) in regions {
            for (i, (bp, sp)) in base_prices.iter().zip(shock_prices).enumerate() {
                let datetime = start + Duration::minutes(30 * i as i64);
                let row = |price: f64, demand: f64| ForecastRow {
                    datetime,
                    region: region.to_string(),
                    features: CalendarFeatures::from_timestamp(datetime),
                    forecast_price: price,
                    forecast_demand: demand,
                };
                baseline.push(row(*bp, *base_demand));
                shock.push(row(*sp, *shock_demand));
            }
        }
        let delta = generate_delta(&baseline, &shock).unwrap();
        ForecastTables {
            baseline,
            shock,
            delta,
        }
    }

    #[test]
    fn test_region_metrics() {
        let tables = tables_for(&[
            ("NSW1", vec![40.0, 50.0, 60.0], vec![52.0, 65.0, 120.0], 1000.0, 1100.0),
            ("VIC1", vec![1.0, 1.0, 1.0], vec![1.0, 1.0, 1.0], 1.0, 1.0),
        ]);
        let m = ScenarioMetrics::for_region(&tables, "NSW1", 100.0).unwrap();
        assert_eq!(m.base_avg_price, 50.0);
        assert_eq!(m.shock_avg_price, 79.0);
        assert!((m.price_impact_pct.unwrap() - 58.0).abs() < 1e-9);
        assert!((m.demand_impact_pct.unwrap() - 10.0).abs() < 1e-9);
        assert!((m.base_price_volatility.unwrap() - 10.0).abs() < 1e-9);
        assert!((m.max_price_delta - 60.0).abs() < 1e-9);
        assert!((m.min_price_delta - 12.0).abs() < 1e-9);
        assert!((m.max_demand_delta - 100.0).abs() < 1e-9);
        // 95th percentile of [40, 50, 60] -> 59
        assert!((m.p95_base_price - 59.0).abs() < 1e-9);
        // (12 + 15 + 60) * 100 * 0.5
        assert!((m.total_cost_impact - 4350.0).abs() < 1e-9);
    }

    #[test]
    fn test_flat_prices_leave_volatility_change_undefined() {
        let tables = tables_for(&[("VIC1", vec![1.0, 1.0], vec![2.0, 2.0], 1.0, 1.0)]);
        let m = ScenarioMetrics::for_region(&tables, "VIC1", 100.0).unwrap();
        assert_eq!(m.base_price_volatility, Some(0.0));
        assert_eq!(m.volatility_change_pct, None);
    }

    #[test]
    fn test_unknown_region() {
        let tables = tables_for(&[("NSW1", vec![1.0], vec![1.0], 1.0, 1.0)]);
        let err = ScenarioMetrics::for_region(&tables, "QLD1", 100.0).unwrap_err();
        assert!(err.to_string().contains("QLD1"));
    }

    #[test]
    fn test_all_regions_in_baseline_order() {
        let tables = tables_for(&[
            ("SA1", vec![1.0], vec![2.0], 1.0, 1.0),
            ("NSW1", vec![1.0], vec![2.0], 1.0, 1.0),
        ]);
        let all = all_region_metrics(&tables, 50.0).unwrap();
        let names: Vec<_> = all.iter().map(|m| m.region.as_str()).collect();
        assert_eq!(names, vec!["SA1", "NSW1"]);
        assert_eq!(all[0].total_cost_impact, 25.0);
    }
}
