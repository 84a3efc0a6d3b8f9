use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// A file of what-if scenarios, applied to the baseline forecast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhatIfSet {
    pub version: Option<u32>,
    #[serde(default)]
    pub defaults: WhatIfDefaults,
    #[serde(default)]
    pub scenarios: Vec<WhatIfSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhatIfDefaults {
    /// Region every scenario applies to unless it names its own.
    /// `None` applies scenarios to all regions.
    pub region: Option<String>,
    #[serde(default = "default_portfolio_mw")]
    pub portfolio_mw: f64,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

pub const DEFAULT_PORTFOLIO_MW: f64 = 100.0;
pub const DEFAULT_WHAT_IF_SEED: u64 = 42;

fn default_portfolio_mw() -> f64 {
    DEFAULT_PORTFOLIO_MW
}

fn default_seed() -> u64 {
    DEFAULT_WHAT_IF_SEED
}

impl Default for WhatIfDefaults {
    fn default() -> Self {
        Self {
            region: None,
            portfolio_mw: default_portfolio_mw(),
            seed: default_seed(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhatIfSpec {
    pub scenario_id: String,
    pub description: Option<String>,
    pub region: Option<String>,
    /// Direct multipliers win over the ones derived from `drivers`.
    pub price_multiplier: Option<f64>,
    pub demand_multiplier: Option<f64>,
    pub volatility_multiplier: Option<f64>,
    pub drivers: Option<MarketDrivers>,
    pub portfolio_mw: Option<f64>,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EconomicStress {
    #[default]
    Low,
    Medium,
    High,
    Crisis,
}

impl EconomicStress {
    pub fn multiplier(self) -> f64 {
        match self {
            EconomicStress::Low => 1.0,
            EconomicStress::Medium => 1.2,
            EconomicStress::High => 1.5,
            EconomicStress::Crisis => 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeatherSeverity {
    #[default]
    Normal,
    Mild,
    Severe,
    Extreme,
}

impl WeatherSeverity {
    pub fn multiplier(self) -> f64 {
        match self {
            WeatherSeverity::Normal => 1.0,
            WeatherSeverity::Mild => 1.1,
            WeatherSeverity::Severe => 1.3,
            WeatherSeverity::Extreme => 1.6,
        }
    }
}

/// Market conditions a scenario can be described by instead of raw multipliers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketDrivers {
    #[serde(default)]
    pub economic_stress: EconomicStress,
    #[serde(default)]
    pub weather_severity: WeatherSeverity,
    #[serde(default)]
    pub fuel_price_change_pct: f64,
    #[serde(default = "default_renewable_pct")]
    pub renewable_availability_pct: f64,
    #[serde(default)]
    pub demand_growth_pct: f64,
}

fn default_renewable_pct() -> f64 {
    100.0
}

impl Default for MarketDrivers {
    fn default() -> Self {
        Self {
            economic_stress: EconomicStress::default(),
            weather_severity: WeatherSeverity::default(),
            fuel_price_change_pct: 0.0,
            renewable_availability_pct: default_renewable_pct(),
            demand_growth_pct: 0.0,
        }
    }
}

impl MarketDrivers {
    /// Each 1% of renewable availability above normal lowers price by 0.3%.
    pub fn price_multiplier(&self) -> f64 {
        let fuel = self.fuel_price_change_pct / 100.0;
        let renewable = (self.renewable_availability_pct - 100.0) / 100.0;
        self.economic_stress.multiplier()
            * self.weather_severity.multiplier()
            * (1.0 + fuel)
            * (1.0 - renewable * 0.3)
    }

    pub fn demand_multiplier(&self) -> f64 {
        (1.0 + self.demand_growth_pct / 100.0) * self.weather_severity.multiplier()
    }

    pub fn volatility_multiplier(&self) -> f64 {
        self.weather_severity.multiplier()
    }
}

/// A scenario with every default and driver folded in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedWhatIf {
    pub scenario_id: String,
    pub description: Option<String>,
    pub region: Option<String>,
    pub price_multiplier: f64,
    pub demand_multiplier: f64,
    pub volatility_multiplier: f64,
    pub portfolio_mw: f64,
    pub seed: u64,
}

impl ResolvedWhatIf {
    /// A scenario built from raw multipliers with the default portfolio and seed.
    pub fn from_multipliers(
        scenario_id: impl Into<String>,
        region: Option<String>,
        price_multiplier: f64,
        demand_multiplier: f64,
        volatility_multiplier: f64,
    ) -> Self {
        Self {
            scenario_id: scenario_id.into(),
            description: None,
            region,
            price_multiplier,
            demand_multiplier,
            volatility_multiplier,
            portfolio_mw: DEFAULT_PORTFOLIO_MW,
            seed: DEFAULT_WHAT_IF_SEED,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("price_multiplier", self.price_multiplier),
            ("demand_multiplier", self.demand_multiplier),
            ("portfolio_mw", self.portfolio_mw),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(anyhow!(
                    "scenario '{}': {} must be positive, got {}",
                    self.scenario_id,
                    name,
                    value
                ));
            }
        }
        if !self.volatility_multiplier.is_finite() || self.volatility_multiplier < 1.0 {
            return Err(anyhow!(
                "scenario '{}': volatility_multiplier must be at least 1.0, got {}",
                self.scenario_id,
                self.volatility_multiplier
            ));
        }
        Ok(())
    }
}

pub fn load_what_if_set(path: &Path) -> Result<WhatIfSet> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading what-if spec '{}'", path.display()))?;
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
            serde_yaml::from_str(&data).context("parsing what-if spec yaml")
        }
        Some(ext) if ext.eq_ignore_ascii_case("json") => {
            serde_json::from_str(&data).context("parsing what-if spec json")
        }
        _ => serde_yaml::from_str(&data)
            .or_else(|_| serde_json::from_str(&data))
            .context("parsing what-if spec"),
    }
}

pub fn resolve_what_ifs(set: &WhatIfSet) -> Result<Vec<ResolvedWhatIf>> {
    if set.scenarios.is_empty() {
        return Err(anyhow!("what-if set contains no scenarios"));
    }
    let defaults = &set.defaults;
    let mut seen = HashSet::new();
    let mut resolved = Vec::with_capacity(set.scenarios.len());
    for scenario in &set.scenarios {
        if scenario.scenario_id.trim().is_empty() {
            return Err(anyhow!("scenario_id cannot be empty"));
        }
        // Ids name the per-scenario output file.
        if !is_file_safe_id(&scenario.scenario_id) {
            return Err(anyhow!(
                "scenario_id '{}' must not contain path separators or '..'",
                scenario.scenario_id
            ));
        }
        if !seen.insert(scenario.scenario_id.clone()) {
            return Err(anyhow!(
                "duplicate scenario_id '{}' in spec",
                scenario.scenario_id
            ));
        }
        let drivers = scenario.drivers.clone().unwrap_or_default();
        let resolved_scenario = ResolvedWhatIf {
            scenario_id: scenario.scenario_id.clone(),
            description: scenario.description.clone(),
            region: scenario.region.clone().or_else(|| defaults.region.clone()),
            price_multiplier: scenario
                .price_multiplier
                .unwrap_or_else(|| drivers.price_multiplier()),
            demand_multiplier: scenario
                .demand_multiplier
                .unwrap_or_else(|| drivers.demand_multiplier()),
            volatility_multiplier: scenario
                .volatility_multiplier
                .unwrap_or_else(|| drivers.volatility_multiplier()),
            portfolio_mw: scenario.portfolio_mw.unwrap_or(defaults.portfolio_mw),
            seed: scenario.seed.unwrap_or(defaults.seed),
        };
        resolved_scenario.validate()?;
        resolved.push(resolved_scenario);
    }
    Ok(resolved)
}

fn is_file_safe_id(id: &str) -> bool {
    !id.contains(['/', '\\']) && !id.contains("..")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_drivers_are_neutral() {
        let drivers = MarketDrivers::default();
        assert_eq!(drivers.price_multiplier(), 1.0);
        assert_eq!(drivers.demand_multiplier(), 1.0);
        assert_eq!(drivers.volatility_multiplier(), 1.0);
    }

    #[test]
    fn test_driver_multipliers() {
        let drivers = MarketDrivers {
            economic_stress: EconomicStress::High,
            weather_severity: WeatherSeverity::Severe,
            fuel_price_change_pct: 20.0,
            renewable_availability_pct: 50.0,
            demand_growth_pct: 10.0,
        };
        // 1.5 * 1.3 * 1.2 * (1 + 0.15)
        assert!((drivers.price_multiplier() - 2.691).abs() < 1e-9);
        assert!((drivers.demand_multiplier() - 1.43).abs() < 1e-9);
        assert_eq!(drivers.volatility_multiplier(), 1.3);
    }

    #[test]
    fn test_resolve_yaml_with_defaults_and_overrides() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("what_if.yaml");
        fs::write(
            &path,
            r#"
defaults:
  region: VIC1
  portfolio_mw: 250
scenarios:
  - scenario_id: heatwave
    drivers:
      weather_severity: extreme
      demand_growth_pct: 5
  - scenario_id: manual
    region: SA1
    price_multiplier: 1.5
    seed: 7
"#,
        )
        .unwrap();
        let set = load_what_if_set(&path).unwrap();
        let resolved = resolve_what_ifs(&set).unwrap();
        assert_eq!(resolved.len(), 2);

        let heatwave = &resolved[0];
        assert_eq!(heatwave.region.as_deref(), Some("VIC1"));
        assert_eq!(heatwave.portfolio_mw, 250.0);
        assert_eq!(heatwave.seed, 42);
        assert!((heatwave.price_multiplier - 1.6).abs() < 1e-12);
        assert!((heatwave.demand_multiplier - 1.68).abs() < 1e-12);
        assert_eq!(heatwave.volatility_multiplier, 1.6);

        let manual = &resolved[1];
        assert_eq!(manual.region.as_deref(), Some("SA1"));
        assert_eq!(manual.price_multiplier, 1.5);
        assert_eq!(manual.demand_multiplier, 1.0);
        assert_eq!(manual.seed, 7);
    }

    #[test]
    fn test_json_spec_without_extension() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("spec");
        fs::write(
            &path,
            r#"{"scenarios": [{"scenario_id": "a", "volatility_multiplier": 2.0}]}"#,
        )
        .unwrap();
        let resolved = resolve_what_ifs(&load_what_if_set(&path).unwrap()).unwrap();
        assert_eq!(resolved[0].volatility_multiplier, 2.0);
        assert_eq!(resolved[0].region, None);
    }

    #[test]
    fn test_rejects_bad_sets() {
        let empty = WhatIfSet {
            version: None,
            defaults: WhatIfDefaults::default(),
            scenarios: vec![],
        };
        assert!(resolve_what_ifs(&empty).is_err());

        let spec = |id: &str, vol: Option<f64>| WhatIfSpec {
            scenario_id: id.into(),
            description: None,
            region: None,
            price_multiplier: None,
            demand_multiplier: None,
            volatility_multiplier: vol,
            drivers: None,
            portfolio_mw: None,
            seed: None,
        };
        let duplicate = WhatIfSet {
            scenarios: vec![spec("x", None), spec("x", None)],
            ..empty.clone()
        };
        let err = resolve_what_ifs(&duplicate).unwrap_err();
        assert!(err.to_string().contains("duplicate"));

        let calm = WhatIfSet {
            scenarios: vec![spec("calm", Some(0.5))],
            ..empty
        };
        assert!(resolve_what_ifs(&calm).is_err());
    }

    #[test]
    fn test_rejects_ids_that_escape_the_output_dir() {
        let with_id = |id: &str| WhatIfSet {
            version: None,
            defaults: WhatIfDefaults::default(),
            scenarios: vec![WhatIfSpec {
                scenario_id: id.into(),
                description: None,
                region: None,
                price_multiplier: Some(1.1),
                demand_multiplier: None,
                volatility_multiplier: None,
                drivers: None,
                portfolio_mw: None,
                seed: None,
            }],
        };
        for bad in ["../x", "a/b", "a\\b", ".."] {
            let err = resolve_what_ifs(&with_id(bad)).unwrap_err();
            assert!(err.to_string().contains("path separators"), "{bad}");
        }
        assert!(resolve_what_ifs(&with_id("heat-wave_2.v1")).is_ok());
    }
}
