//! Collection matching CLI.

use std::fs;
use std::io::{self, IsTerminal};

use anyhow::Context;
use clap::{ColorChoice, Parser};
use tracing::debug;

use collate_match::compare;

mod cli;
mod input;
mod logging;
mod summary;

use crate::cli::{Cli, Command, CompareArgs, LogFormatArg};
use crate::logging::{LogConfig, LogFormat, init_logging};
use crate::summary::{DisplayOptions, print_summary};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    if let Err(error) = init_logging(&log_config_from_cli(&cli)) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match cli.command {
        Command::Compare(args) => match run_compare(&args) {
            Ok(fully_resolved) => {
                // Ambiguity is a first-class outcome, but scripts need to
                // know a manual pass is still pending.
                if fully_resolved { 0 } else { 2 }
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
        Command::DefaultConfig => match print_default_config() {
            Ok(()) => 0,
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
    };
    std::process::exit(exit_code);
}

fn run_compare(args: &CompareArgs) -> anyhow::Result<bool> {
    let config = input::load_config(args.config.as_deref())?;
    config.validate().context("invalid match configuration")?;
    let left = input::load_collection(&args.left, &config)?;
    let right = input::load_collection(&args.right, &config)?;
    debug!(
        left = left.len(),
        right = right.len(),
        "collections loaded, starting comparison"
    );

    let result = compare(left, right, &config)?;
    print_summary(
        &result,
        &config,
        &DisplayOptions {
            explain: args.explain,
            show_unmatched: args.show_unmatched,
        },
    );

    if let Some(path) = &args.report {
        let json = serde_json::to_string_pretty(&result).context("serializing report")?;
        fs::write(path, json).with_context(|| format!("writing report {}", path.display()))?;
        println!("Report written to {}", path.display());
    }
    Ok(result.is_fully_resolved())
}

fn print_default_config() -> anyhow::Result<()> {
    let config = input::default_config();
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

/// Builds logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !cli.verbosity.is_present();
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
