//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Scenecheck: temporal smoothing and consistency checks for driving-scene annotations
#[derive(Parser)]
#[command(name = "scenecheck")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value = "pretty")]
    pub log_format: LogFormatArg,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Normalize, smooth and check an annotation file
    Run {
        /// Path to the annotation file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Engine configuration (default: built-in ODD bindings)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output path for the checked table (default: <file>.checked.<ext>)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output path for the JSON report (default: <file>.report.json)
        #[arg(long)]
        report: Option<PathBuf>,

        /// Flip interior segments shorter than N frames
        #[arg(short = 'n', long = "flip-below")]
        n: Option<usize>,

        /// Flag segments shorter than M frames
        #[arg(short = 'm', long = "flag-below")]
        m: Option<usize>,

        /// Scene identifier column
        #[arg(long)]
        scene_col: Option<String>,

        /// Frame order column
        #[arg(long)]
        order_col: Option<String>,

        /// Fail when the scene column is missing
        #[arg(long)]
        require_scenes: bool,

        /// Worker threads for per-scene smoothing
        #[arg(short, long)]
        workers: Option<usize>,
    },

    /// Write the built-in configuration as JSON
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Load and validate a configuration file
    ValidateConfig {
        /// Path to the configuration file
        #[arg(value_name = "CONFIG")]
        file: PathBuf,
    },

    /// Summarize a saved report
    Summary {
        /// Path to the report file
        #[arg(value_name = "REPORT")]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Log output format.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum LogFormatArg {
    /// Human-readable output
    #[default]
    Pretty,
    /// Single-line output
    Compact,
    /// JSON lines
    Json,
}
