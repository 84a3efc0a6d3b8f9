//! Scenario analytics over the forecast tables: user-defined what-if
//! scenarios, per-region shock metrics and the regional risk matrix.

pub mod metrics;
pub mod risk;
pub mod spec;
pub mod stats;
pub mod what_if;

pub use metrics::{all_region_metrics, ScenarioMetrics};
pub use risk::{risk_matrix, RegionRisk, RiskLevel, RiskQuadrant};
pub use spec::{
    load_what_if_set, resolve_what_ifs, EconomicStress, MarketDrivers, ResolvedWhatIf,
    WeatherSeverity, WhatIfDefaults, WhatIfSet, WhatIfSpec, DEFAULT_PORTFOLIO_MW,
};
pub use what_if::{
    apply_what_if, run_what_ifs, write_what_if_csv, WhatIfOutcome, WhatIfRow, WhatIfSummary,
};
