use clap::{CommandFactory, Parser, Subcommand, ValueEnum, ValueHint};
use clap_complete::Shell;
use enops_auth::AuthMode;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "enops", author, version, about = "Energy market forecast generator", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to ./enops.toml when present)
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Set the logging level (overrides the config file)
    #[arg(long, global = true)]
    pub log_level: Option<tracing::Level>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate and check the baseline, shock and delta forecasts
    Forecast {
        #[command(subcommand)]
        command: ForecastCommands,
    },
    /// Scenario analytics over generated forecasts
    Scenarios {
        #[command(subcommand)]
        command: ScenariosCommands,
    },
    /// Dashboard sign-in helpers
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: Shell,
        /// Write output to a file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ForecastCommands {
    /// Generate the 7-day forecast tables
    Run {
        /// Historical market table (.parquet or .csv)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        input: Option<PathBuf>,
        /// Directory the three CSV files are written to
        #[arg(short, long, value_hint = ValueHint::DirPath)]
        output_dir: Option<PathBuf>,
        /// Log at debug level
        #[arg(short, long)]
        verbose: bool,
        /// Only check that the input exists
        #[arg(long)]
        dry_run: bool,
        /// Seed the noise generator for a reproducible run
        #[arg(long)]
        seed: Option<u64>,
        /// Region used when the input has no region column
        #[arg(long)]
        region_default: Option<String>,
    },
    /// Check that the input exists, parses and is recent
    CheckInput {
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        input: Option<PathBuf>,
        /// Report the input as stale beyond this many days
        #[arg(long)]
        max_age_days: Option<u64>,
    },
    /// Check that all three forecast files exist and are non-empty
    CheckOutputs {
        #[arg(short, long, value_hint = ValueHint::DirPath)]
        output_dir: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ScenariosCommands {
    /// Apply what-if scenarios from a YAML/JSON file to the baseline
    WhatIf {
        /// Scenario file
        #[arg(long, value_hint = ValueHint::FilePath)]
        spec: PathBuf,
        /// Directory holding the forecast CSVs
        #[arg(short, long, value_hint = ValueHint::DirPath)]
        data_dir: Option<PathBuf>,
        /// Write one what_if_<scenario_id>.csv per scenario here
        #[arg(long, value_hint = ValueHint::DirPath)]
        out_dir: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Shock-versus-baseline metrics for one region (or all)
    Metrics {
        #[arg(short, long, value_hint = ValueHint::DirPath)]
        data_dir: Option<PathBuf>,
        /// Region to report; all regions when omitted
        #[arg(long)]
        region: Option<String>,
        /// Portfolio size used for the cost impact
        #[arg(long, default_value_t = enops_scenarios::DEFAULT_PORTFOLIO_MW)]
        portfolio_mw: f64,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Regional risk matrix of the shock scenario
    Risk {
        #[arg(short, long, value_hint = ValueHint::DirPath)]
        data_dir: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
}

#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Show what a dashboard visitor would get
    Status {
        /// demo or oauth (overrides the config file)
        #[arg(long)]
        mode: Option<AuthMode>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        build_cli_command().debug_assert();
    }

    #[test]
    fn test_forecast_run_flags() {
        let cli = Cli::try_parse_from([
            "enops", "forecast", "run", "-i", "in.csv", "-o", "out", "-v", "--seed", "5",
        ])
        .unwrap();
        match cli.command {
            Commands::Forecast {
                command:
                    ForecastCommands::Run {
                        input,
                        output_dir,
                        verbose,
                        seed,
                        dry_run,
                        ..
                    },
            } => {
                assert_eq!(input, Some(PathBuf::from("in.csv")));
                assert_eq!(output_dir, Some(PathBuf::from("out")));
                assert!(verbose);
                assert!(!dry_run);
                assert_eq!(seed, Some(5));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_auth_mode_flag() {
        let cli = Cli::try_parse_from(["enops", "auth", "status", "--mode", "oauth"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Auth {
                command: AuthCommands::Status {
                    mode: Some(AuthMode::OAuth)
                }
            }
        ));
    }
}
