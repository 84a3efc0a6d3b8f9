use std::process::ExitCode;

use clap::Parser;
use enops_cli::cli::{Cli, Commands, ForecastCommands};
use enops_cli::{config, logging};
use tracing::{error, info, Level};

mod commands;

use crate::commands::{auth, completions, forecast, scenarios};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match config::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    let verbose = matches!(
        &cli.command,
        Commands::Forecast {
            command: ForecastCommands::Run { verbose: true, .. }
        }
    );
    let level = match cli.log_level {
        Some(level) => Ok(level),
        None if verbose => Ok(Level::DEBUG),
        None => config.log_level(),
    };
    let init = level.and_then(|level| logging::init(level, config.logging.file.as_deref()));
    if let Err(err) = init {
        eprintln!("error: {err:#}");
        return ExitCode::FAILURE;
    }

    let (name, result) = match &cli.command {
        Commands::Forecast { command } => ("Forecast", forecast::handle(command, &config)),
        Commands::Scenarios { command } => ("Scenarios", scenarios::handle(command, &config)),
        Commands::Auth { command } => ("Auth", auth::handle(command, &config)),
        Commands::Completions { shell, out } => {
            ("Completions", completions::handle(*shell, out.as_deref()))
        }
    };
    match result {
        Ok(()) => {
            info!("{name} command successful!");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{name} command failed: {:?}", e);
            ExitCode::FAILURE
        }
    }
}
