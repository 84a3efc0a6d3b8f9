use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use enops_cli::cli::{OutputFormat, ScenariosCommands};
use enops_cli::config::EnopsConfig;
use enops_forecast::load_forecast_tables;
use enops_scenarios::{
    all_region_metrics, load_what_if_set, resolve_what_ifs, risk_matrix, run_what_ifs,
    write_what_if_csv, RegionRisk, ScenarioMetrics, WhatIfSummary,
};
use serde::Serialize;
use tabwriter::TabWriter;
use tracing::info;

pub fn handle(command: &ScenariosCommands, config: &EnopsConfig) -> Result<()> {
    match command {
        ScenariosCommands::WhatIf {
            spec,
            data_dir,
            out_dir,
            format,
        } => {
            let tables = load_forecast_tables(&data_dir_or(data_dir, config))?;
            let set = load_what_if_set(spec)?;
            let scenarios = resolve_what_ifs(&set)?;
            let outcomes = run_what_ifs(&tables.baseline, &scenarios)?;
            if let Some(dir) = out_dir {
                for outcome in &outcomes {
                    let path = what_if_path(dir, &outcome.scenario.scenario_id);
                    write_what_if_csv(&path, &outcome.rows)?;
                    info!("Saved what-if '{}' to {}", outcome.scenario.scenario_id, path.display());
                }
            }
            let summaries: Vec<WhatIfSummary> =
                outcomes.into_iter().map(|outcome| outcome.summary).collect();
            emit(&summaries, *format, print_what_if_table)
        }
        ScenariosCommands::Metrics {
            data_dir,
            region,
            portfolio_mw,
            format,
        } => {
            let tables = load_forecast_tables(&data_dir_or(data_dir, config))?;
            let metrics = match region {
                Some(region) => vec![ScenarioMetrics::for_region(&tables, region, *portfolio_mw)?],
                None => all_region_metrics(&tables, *portfolio_mw)?,
            };
            emit(&metrics, *format, print_metrics_table)
        }
        ScenariosCommands::Risk { data_dir, format } => {
            let tables = load_forecast_tables(&data_dir_or(data_dir, config))?;
            emit(&risk_matrix(&tables), *format, print_risk_table)
        }
    }
}

fn data_dir_or(data_dir: &Option<PathBuf>, config: &EnopsConfig) -> PathBuf {
    data_dir
        .clone()
        .unwrap_or_else(|| config.forecast.output_dir.clone())
}

pub(crate) fn what_if_path(dir: &Path, scenario_id: &str) -> PathBuf {
    dir.join(format!("what_if_{scenario_id}.csv"))
}

fn emit<T: Serialize>(
    rows: &[T],
    format: OutputFormat,
    table: fn(&[T]) -> Result<()>,
) -> Result<()> {
    match format {
        OutputFormat::Table => table(rows),
        OutputFormat::Json => {
            serde_json::to_writer_pretty(io::stdout(), rows)
                .map_err(|err| anyhow::anyhow!("serializing to JSON: {err}"))?;
            println!();
            Ok(())
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(io::stdout());
            for row in rows {
                writer.serialize(row)?;
            }
            writer.flush()?;
            Ok(())
        }
    }
}

fn pct(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:+.1}%"))
}

fn num(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}"))
}

fn print_what_if_table(rows: &[WhatIfSummary]) -> Result<()> {
    let mut writer = TabWriter::new(io::stdout());
    writeln!(
        writer,
        "SCENARIO\tROWS\tPRICE IMPACT\tDEMAND IMPACT\tMEAN PRICE DELTA\tFINANCIAL IMPACT\tRISK"
    )?;
    for row in rows {
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{:.2}\t{:.0}\t{}",
            row.scenario_id,
            row.rows,
            pct(row.price_impact_pct),
            pct(row.demand_impact_pct),
            row.mean_price_delta,
            row.financial_impact,
            row.risk_level.as_str()
        )?;
    }
    writer.flush()?;
    Ok(())
}

fn print_metrics_table(rows: &[ScenarioMetrics]) -> Result<()> {
    let mut writer = TabWriter::new(io::stdout());
    writeln!(
        writer,
        "REGION\tBASE PRICE\tSHOCK PRICE\tPRICE IMPACT\tDEMAND IMPACT\tVOLATILITY CHANGE\tMAX PRICE DELTA\tCOST IMPACT"
    )?;
    for row in rows {
        writeln!(
            writer,
            "{}\t{:.2}\t{:.2}\t{}\t{}\t{}\t{:.2}\t{:.0}",
            row.region,
            row.base_avg_price,
            row.shock_avg_price,
            pct(row.price_impact_pct),
            pct(row.demand_impact_pct),
            pct(row.volatility_change_pct),
            row.max_price_delta,
            row.total_cost_impact
        )?;
    }
    writer.flush()?;
    Ok(())
}

fn print_risk_table(rows: &[RegionRisk]) -> Result<()> {
    let mut writer = TabWriter::new(io::stdout());
    writeln!(
        writer,
        "REGION\tPRICE IMPACT\tDEMAND IMPACT\tVOLATILITY\tMAX SPIKE\tQUADRANT\tRISK"
    )?;
    for row in rows {
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{:.2}\t{}\t{}",
            row.region,
            pct(row.price_impact_pct),
            pct(row.demand_impact_pct),
            num(row.price_volatility),
            row.max_price_spike,
            row.quadrant.as_str(),
            row.risk_level.as_str()
        )?;
    }
    writer.flush()?;
    Ok(())
}
