//! CLI argument definitions.

use super::validators::{parse_positive_u32, parse_window_secs};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Extract labeled spectrogram training images from timestamped recordings.
#[derive(Debug, Parser)]
#[command(name = "spectract")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to the CSV label table (columns: UTC, Species).
    pub labels: Option<PathBuf>,

    /// Common options for extraction.
    #[command(flatten)]
    pub extract: ExtractArgs,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage configuration.
    Config {
        /// Configuration action to perform.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommand actions.
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ConfigAction {
    /// Create default configuration file.
    Init,
    /// Display current configuration.
    Show,
    /// Print configuration file path.
    Path,
}

/// Arguments for the extract command.
#[derive(Debug, Args)]
pub struct ExtractArgs {
    /// Directory of raw audio recordings.
    #[arg(short, long, env = "SPECTRACT_AUDIO_DIR")]
    pub audio_dir: Option<PathBuf>,

    /// Output directory for spectrogram images (created if absent).
    #[arg(short, long, env = "SPECTRACT_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Recording file duration in seconds.
    #[arg(long, value_parser = parse_positive_u32, env = "SPECTRACT_FILE_DURATION")]
    pub file_duration: Option<u32>,

    /// Spectrogram window duration in seconds.
    #[arg(short, long, value_parser = parse_window_secs, env = "SPECTRACT_WINDOW")]
    pub window: Option<u32>,

    /// Species codes to render from detections (comma-separated).
    #[arg(short, long, value_delimiter = ',', env = "SPECTRACT_SPECIES")]
    pub species: Option<Vec<String>>,

    /// Number of background segments to sample.
    #[arg(long, env = "SPECTRACT_SAMPLE_SIZE")]
    pub sample_size: Option<usize>,

    /// Random seed for reproducible background sampling.
    #[arg(long, env = "SPECTRACT_SEED")]
    pub seed: Option<u64>,

    /// Worker parallelism (default: available hardware concurrency).
    #[arg(short, long, env = "SPECTRACT_JOBS")]
    pub jobs: Option<usize>,

    /// Fail on unparseable audio filenames instead of skipping them.
    #[arg(long)]
    pub strict_filenames: bool,

    /// Suppress progress output.
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable the progress bar only.
    #[arg(long)]
    pub no_progress: bool,

    /// Increase logging verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
