//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "schemap",
    version,
    about = "Propose field mappings between schemas and keep them in sync as sources drift",
    long_about = "Propose field-level mappings between two schemas.\n\n\
                  Schemas are JSON files with an id, source_id, version and an ordered\n\
                  list of fields (name, data_type, nullable)."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
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

    /// TOML file with [matching] and [events] settings.
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate mappings from a source schema into a target schema.
    Map(MapArgs),

    /// Show the changes between two versions of a source schema.
    Diff(DiffArgs),

    /// Map a baseline schema, then carry the mappings over to its new version.
    Sync(SyncArgs),
}

#[derive(Args)]
pub struct MapArgs {
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    #[arg(value_name = "TARGET")]
    pub target: PathBuf,

    /// Also print the conversion expression for each mapping.
    #[arg(long = "transformations")]
    pub transformations: bool,

    /// Also print confidence statistics.
    #[arg(long = "stats")]
    pub stats: bool,

    /// Save the mapping set into this repository directory.
    #[arg(long = "save", value_name = "DIR")]
    pub save: Option<PathBuf>,

    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: OutputFormatArg,
}

#[derive(Args)]
pub struct DiffArgs {
    #[arg(value_name = "BASELINE")]
    pub baseline: PathBuf,

    #[arg(value_name = "CURRENT")]
    pub current: PathBuf,

    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: OutputFormatArg,
}

#[derive(Args)]
pub struct SyncArgs {
    #[arg(value_name = "BASELINE")]
    pub baseline: PathBuf,

    #[arg(value_name = "CURRENT")]
    pub current: PathBuf,

    #[arg(value_name = "TARGET")]
    pub target: PathBuf,

    /// Print every published notification as a JSON line.
    #[arg(long = "events")]
    pub events: bool,

    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: OutputFormatArg,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormatArg {
    Table,
    Json,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
