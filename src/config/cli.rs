//! CLI argument parsing
//!
//! # Usage
//!
//! ```bash
//! cuaderno download https://example.com/weights.bin weights.bin
//! cuaderno download https://example.com/weights.bin weights.bin --config notebook.yaml
//! cuaderno validate notebook.yaml
//! cuaderno info notebook.yaml
//! cuaderno checkpoint-path "ckpt_{:03}.json" 7
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Cuaderno: notebook helpers for model training sessions
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "cuaderno")]
#[command(version)]
#[command(about = "Checkpointing, downloads and frame display for notebook training sessions")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Download a file unless it already exists
    Download(DownloadArgs),

    /// Validate a configuration file
    Validate(ValidateArgs),

    /// Display information about a configuration
    Info(InfoArgs),

    /// Print the path a checkpoint template yields for an epoch
    CheckpointPath(CheckpointPathArgs),
}

/// Arguments for the download command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct DownloadArgs {
    /// URL to fetch
    #[arg(value_name = "URL")]
    pub url: String,

    /// Destination file
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Take download settings from a YAML configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

/// Arguments for the validate command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct ValidateArgs {
    /// Path to YAML configuration file
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,
}

/// Arguments for the info command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct InfoArgs {
    /// Path to YAML configuration file
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,
}

/// Arguments for the checkpoint-path command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct CheckpointPathArgs {
    /// Path template with one epoch slot
    #[arg(value_name = "TEMPLATE")]
    pub template: String,

    /// Epoch index
    #[arg(value_name = "EPOCH")]
    pub epoch: usize,
}

/// Parse CLI arguments from an iterator (for testing)
pub fn parse_args<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args)
}
