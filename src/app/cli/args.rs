//! Command line arguments
//!
//! Every option is optional here so that values missing on the command line
//! can fall back to the configuration file and then to built-in defaults.

use crate::queue::SourceId;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone, Default, PartialEq)]
#[command(name = "sensorbuf")]
#[command(about = "Sensor gateway buffer: one producer, a fixed set of reader roles")]
#[command(version)]
#[command(after_help = " * can be specified multiple times or as a comma-separated list")]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long = "config-file", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Number of records to produce
    #[arg(short = 'n', long = "records", value_name = "COUNT")]
    pub records: Option<usize>,

    /// Sensor ids to simulate*
    #[arg(short = 's', long = "sources", value_name = "IDS", value_delimiter = ',', action = ArgAction::Append)]
    pub sources: Vec<SourceId>,

    /// Pause between produced records in milliseconds
    #[arg(short = 'i', long = "interval-ms", value_name = "MS")]
    pub interval_ms: Option<u64>,

    /// Maximum number of queued nodes (unbounded if not set)
    #[arg(long = "node-capacity", value_name = "COUNT")]
    pub node_capacity: Option<usize>,

    /// Log level
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", value_parser = ["trace", "debug", "info", "warn", "error", "off"])]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(short = 'o', long = "log-format", value_name = "FORMAT", value_parser = ["text", "ext", "json"])]
    pub log_format: Option<String>,

    /// Log file path (use 'none' to disable file logging)
    #[arg(short = 'f', long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Force colored output
    #[arg(long = "color", action = ArgAction::SetTrue, conflicts_with = "no_color")]
    pub color: bool,

    /// Disable colored output
    #[arg(long = "no-color", action = ArgAction::SetTrue)]
    pub no_color: bool,

    /// More output (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// Less output (repeatable)
    #[arg(short = 'q', long = "quiet", action = ArgAction::Count)]
    pub quiet: u8,
}

impl Args {
    /// Net verbosity: `-v` counts up, `-q` counts down
    pub fn verbosity(&self) -> i8 {
        self.verbose.min(10) as i8 - self.quiet.min(10) as i8
    }

    /// `Some(true)` for `--color`, `Some(false)` for `--no-color`, else `None`
    pub fn color_choice(&self) -> Option<bool> {
        match (self.color, self.no_color) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}
