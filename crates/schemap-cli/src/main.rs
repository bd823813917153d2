//! Schema mapping CLI.

use std::io::{self, IsTerminal};

use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};
use schemap_cli::commands::{run_diff, run_map, run_sync};
use schemap_cli::config::AppConfig;
use schemap_cli::logging::{LogConfig, LogFormat, init_logging};
use serde::Serialize;
use tracing::level_filters::LevelFilter;

mod cli;
mod summary;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg, OutputFormatArg};
use crate::summary::{print_diff_report, print_map_report, print_sync_report};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
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

fn run(cli: &Cli) -> Result<()> {
    let config = AppConfig::load(cli.config.as_deref())?;
    match &cli.command {
        Command::Map(args) => {
            let report = run_map(&config, &args.source, &args.target, args.save.as_deref())?;
            match args.format {
                OutputFormatArg::Table => {
                    print_map_report(&report, args.transformations, args.stats);
                }
                OutputFormatArg::Json => print_json(&report)?,
            }
        }
        Command::Diff(args) => {
            let report = run_diff(&args.baseline, &args.current)?;
            match args.format {
                OutputFormatArg::Table => print_diff_report(&report),
                OutputFormatArg::Json => print_json(&report)?,
            }
        }
        Command::Sync(args) => {
            let report = run_sync(&config, &args.baseline, &args.current, &args.target)?;
            match args.format {
                OutputFormatArg::Table => print_sync_report(&report),
                OutputFormatArg::Json => print_json(&report)?,
            }
            if args.events {
                for message in &report.events {
                    println!("{}", message.to_json().context("encode event")?);
                }
            }
        }
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("encode report")?
    );
    Ok(())
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
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
