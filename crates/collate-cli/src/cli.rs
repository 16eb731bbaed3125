//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "collate",
    version,
    about = "Match records across two collections",
    long_about = "Compare two JSON collection files and report which records \
                  refer to the same entity.\n\n\
                  Matching runs in tiers (exact id, exact key, normalized key, \
                  fuzzy) and surfaces near-ties for manual review instead of \
                  guessing."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for silence).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Log output format (pretty for humans, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compare two collection files and print the match report.
    Compare(CompareArgs),

    /// Print the default match configuration as JSON.
    DefaultConfig,
}

#[derive(Parser)]
pub struct CompareArgs {
    /// Left collection (JSON array of records).
    #[arg(value_name = "LEFT")]
    pub left: PathBuf,

    /// Right collection (JSON array of records).
    #[arg(value_name = "RIGHT")]
    pub right: PathBuf,

    /// Match configuration file (JSON); defaults to the built-in
    /// title/year/platform schema.
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Write the full comparison result as JSON to this path.
    #[arg(long = "report", value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Print a per-field similarity breakdown for every matched pair.
    #[arg(long = "explain")]
    pub explain: bool,

    /// List unmatched records instead of only counting them.
    #[arg(long = "show-unmatched")]
    pub show_unmatched: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
