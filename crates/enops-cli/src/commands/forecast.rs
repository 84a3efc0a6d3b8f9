use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use enops_cli::cli::ForecastCommands;
use enops_cli::config::EnopsConfig;
use enops_forecast::{
    check_outputs, run_operational_forecast, validate_input, ForecastOptions, OutputFiles,
};
use tracing::info;

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

pub fn handle(command: &ForecastCommands, config: &EnopsConfig) -> Result<()> {
    match command {
        ForecastCommands::Run {
            input,
            output_dir,
            dry_run,
            seed,
            region_default,
            ..
        } => {
            let options = ForecastOptions {
                input: input.clone().unwrap_or_else(|| config.forecast.input.clone()),
                output_dir: output_dir
                    .clone()
                    .unwrap_or_else(|| config.forecast.output_dir.clone()),
                seed: seed.or(config.forecast.seed),
                default_region: region_default
                    .clone()
                    .unwrap_or_else(|| config.forecast.default_region.clone()),
                ..ForecastOptions::default()
            };
            if *dry_run {
                return dry_run_check(&options);
            }
            run(&options)
        }
        ForecastCommands::CheckInput {
            input,
            max_age_days,
        } => {
            let input = input.clone().unwrap_or_else(|| config.forecast.input.clone());
            let days = max_age_days.unwrap_or(config.forecast.max_input_age_days);
            let check = validate_input(&input, Duration::from_secs(days * SECONDS_PER_DAY))?;
            println!(
                "{}: {} rows, modified {:.1} hours ago",
                input.display(),
                check.rows,
                check.age.as_secs_f64() / 3600.0
            );
            if check.stale {
                println!("warning: input is older than {days} day(s)");
            }
            Ok(())
        }
        ForecastCommands::CheckOutputs { output_dir } => {
            let dir = output_dir
                .clone()
                .unwrap_or_else(|| config.forecast.output_dir.clone());
            let files = check_outputs(&dir)?;
            print_files(&files);
            Ok(())
        }
    }
}

fn dry_run_check(options: &ForecastOptions) -> Result<()> {
    if !options.input.is_file() {
        return Err(anyhow!("input file not found: {}", options.input.display()));
    }
    println!(
        "Dry run: would forecast from {} into {}",
        options.input.display(),
        options.output_dir.display()
    );
    Ok(())
}

fn run(options: &ForecastOptions) -> Result<()> {
    let start = Instant::now();
    let report = run_operational_forecast(options)?;
    println!("{}", report.message());
    println!(
        "{} region(s), {} rows per table, {} .. {}",
        report.regions.len(),
        report.rows_per_table,
        report.horizon_start,
        report.horizon_end
    );
    print_files(&report.files());
    info!("forecast finished in {:?}", start.elapsed());
    Ok(())
}

fn print_files(files: &OutputFiles) {
    for (table, path) in files.iter() {
        println!("  {:<9} {}", table.label(), path.display());
    }
}
