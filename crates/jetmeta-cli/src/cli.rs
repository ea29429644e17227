//! CLI argument definitions for the jetmeta tool.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "jetmeta",
    version,
    about = "Produce and inspect jet-tagging training metadata",
    long_about = "Scan a directory of event-data files, compute per-variable\n\
                  normalization statistics and class-rebalancing histograms,\n\
                  and persist them as a metadata descriptor for training."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
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
}

#[derive(Subcommand)]
pub enum Command {
    /// Scan a dataset directory and write a metadata descriptor.
    Produce(ProduceArgs),

    /// Load a metadata descriptor and print its summary.
    Inspect(InspectArgs),
}

#[derive(Parser)]
pub struct ProduceArgs {
    /// Dataset directory to scan recursively.
    #[arg(value_name = "INPUT_DIR")]
    pub input_dir: PathBuf,

    /// Metadata configuration file (JSON); defaults apply when omitted.
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output descriptor path (default: <INPUT_DIR>/metadata.json).
    #[arg(long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Enumerate the held-out test sample instead of train/val files.
    #[arg(long = "test-sample")]
    pub test_sample: bool,

    /// Fix the sampling RNG seed for reproducible runs.
    #[arg(long = "seed", value_name = "N")]
    pub seed: Option<u64>,
}

#[derive(Parser)]
pub struct InspectArgs {
    /// Metadata descriptor to load.
    #[arg(value_name = "METADATA")]
    pub metadata: PathBuf,
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
