//! PPS CSV uploader.

use std::io::{self, IsTerminal};

use clap::Parser;

mod cli;
mod commands;
mod logging;

use crate::cli::{Cli, Command, LogFormatArg};
use crate::commands::{load_config, run_import, run_runs};
use crate::logging::{init_logging, LogConfig, LogFormat};

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_logging(&log_config_from_cli(&cli)) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }

    let exit_code = match run(&cli) {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let json = match &cli.command {
        Command::Import(args) => {
            let config = load_config(cli.config.as_deref(), Some(args))?;
            // Without a config file the database keeps its stored key uniqueness.
            let keys = cli.config.as_ref().map(|_| config.key_uniqueness);
            let report = run_import(&cli.db, config, keys, args)?;
            report.to_json()?
        }
        Command::Runs(args) => {
            let runs = run_runs(&cli.db, args)?;
            serde_json::to_string_pretty(&runs)?
        }
    };
    println!("{json}");
    Ok(())
}

fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    LogConfig::from_verbosity(cli.verbose)
        .with_format(format)
        .with_ansi(io::stderr().is_terminal())
}
