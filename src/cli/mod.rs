//! CLI Module
//!
//! Command-line interface for cutting samples out of recordings.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Samplecut - cut time ranges out of recordings as standalone WAV samples
#[derive(Parser, Debug)]
#[command(name = "samplecut")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Path to the JSON settings file
    #[arg(short, long, global = true, default_value = "samplecut.json")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show format and duration of a recording
    #[command(name = "info")]
    Info {
        /// Input WAV file
        input: PathBuf,
    },

    /// Cut a range out of a recording and save it as WAV
    #[command(name = "extract")]
    Extract {
        /// Input WAV file
        input: PathBuf,

        /// Start of the range in seconds (default: beginning)
        #[arg(short, long, allow_negative_numbers = true)]
        start: Option<f64>,

        /// End of the range in seconds (default: end of recording)
        #[arg(short, long, allow_negative_numbers = true)]
        end: Option<f64>,

        /// Output file (default: export directory from settings)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write 32-bit float samples
        #[arg(long)]
        float: bool,

        /// Keep only the first channel unless the source is stereo
        #[arg(long)]
        first_channel_only: bool,
    },

    /// Play a range back and wait until it ends (Ctrl-C stops)
    #[command(name = "preview")]
    Preview {
        /// Input WAV file
        input: PathBuf,

        /// Start of the range in seconds
        #[arg(short, long, allow_negative_numbers = true)]
        start: Option<f64>,

        /// End of the range in seconds
        #[arg(short, long, allow_negative_numbers = true)]
        end: Option<f64>,
    },

    /// Validate start/end text the way the range form does
    #[command(name = "check-range")]
    CheckRange {
        /// Start field text (may be empty)
        #[arg(allow_hyphen_values = true)]
        start: String,

        /// End field text (may be empty)
        #[arg(allow_hyphen_values = true)]
        end: String,
    },
}
