//! CLI argument definitions for the PPS uploader.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use pps_core::{EntityKind, HeaderBinding, ImportPolicy};

#[derive(Parser)]
#[command(
    name = "pps-import",
    version,
    about = "Import Point Prevalence Survey CSV exports into SQLite",
    long_about = "Import Point Prevalence Survey CSV exports into SQLite.\n\n\
                  One file per entity: patients first, then antibiotics, antibiotic\n\
                  details, indications, optional vars and specimens."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// SQLite database file.
    #[arg(
        long = "db",
        value_name = "PATH",
        env = "PPS_DATABASE",
        default_value = "pps.sqlite",
        global = true
    )]
    pub db: PathBuf,

    /// JSON import configuration file.
    #[arg(long = "config", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v for debug, -vv for trace).
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log output format (pretty for humans, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,
}

#[derive(Subcommand)]
pub enum Command {
    /// Import one CSV export and print the upload report.
    Import(ImportArgs),

    /// Show recent imports from the ledger.
    Runs(RunsArgs),
}

#[derive(Parser)]
pub struct ImportArgs {
    /// Entity the file holds (patients, antibiotics, antibiotic-details,
    /// indications, optional-vars, specimens).
    #[arg(value_name = "ENTITY")]
    pub entity: EntityKind,

    /// CSV file to import.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Existing-key policy (skip-if-exists, upsert). Overrides the config file.
    #[arg(long = "policy", value_name = "POLICY")]
    pub policy: Option<ImportPolicy>,

    /// Header binding (positional, auto, strict). Overrides the config file.
    #[arg(long = "header-binding", value_name = "MODE")]
    pub header_binding: Option<HeaderBinding>,
}

#[derive(Parser)]
pub struct RunsArgs {
    /// Number of imports to show.
    #[arg(long = "limit", default_value_t = 20)]
    pub limit: usize,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
