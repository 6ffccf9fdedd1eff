//! Cuaderno CLI
//!
//! # Usage
//!
//! ```bash
//! # Fetch a dataset once; later runs skip it
//! cuaderno download https://example.com/mnist.npz data/mnist.npz
//!
//! # Validate a notebook config
//! cuaderno validate notebook.yaml
//!
//! # Show config info
//! cuaderno info notebook.yaml
//!
//! # Preview where an epoch's checkpoint lands
//! cuaderno checkpoint-path "ckpt_{:03}.safetensors" 12
//! ```

use clap::Parser;
use cuaderno::config::{
    load_config, CheckpointPathArgs, Cli, Command, DownloadArgs, DownloadSpec, InfoArgs,
    ValidateArgs,
};
use cuaderno::download::DownloadOutcome;
use cuaderno::train::PathTemplate;
use std::process::ExitCode;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    let result = match cli.command {
        Command::Download(args) => run_download(args),
        Command::Validate(args) => run_validate(args),
        Command::Info(args) => run_info(args),
        Command::CheckpointPath(args) => run_checkpoint_path(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(cli: &Cli) {
    let level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };

    // RUST_LOG wins over the flags when set
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(filter);

    tracing_subscriber::registry().with(stderr_layer).init();
}

fn run_download(args: DownloadArgs) -> cuaderno::Result<()> {
    let mut spec = match &args.config {
        Some(path) => load_config(path)?.download,
        None => DownloadSpec::default(),
    };
    if args.no_progress {
        spec.progress = false;
    }

    match spec.build()?.download(&args.url, &args.path)? {
        DownloadOutcome::Skipped => {
            println!("{} already exists, skipped", args.path.display());
        }
        DownloadOutcome::Downloaded { bytes } => {
            println!("Downloaded {bytes} bytes to {}", args.path.display());
        }
    }
    Ok(())
}

fn run_validate(args: ValidateArgs) -> cuaderno::Result<()> {
    load_config(&args.config)?;
    println!("Configuration valid: {}", args.config.display());
    Ok(())
}

fn run_info(args: InfoArgs) -> cuaderno::Result<()> {
    let spec = load_config(&args.config)?;

    println!("Configuration: {}", args.config.display());
    match &spec.checkpoint {
        Some(checkpoint) => {
            let fallback = checkpoint.save_config();
            println!("  Checkpoint template: {}", checkpoint.path_template);
            println!("  Fallback format: {:?}", fallback.format);
            println!("  Pretty: {}", fallback.pretty);
        }
        None => println!("  Checkpoint: (none)"),
    }
    println!("  Download chunk size: {}", spec.download.chunk_size);
    println!("  Download buffer size: {}", spec.download.buffer_size);
    println!("  Progress bar: {}", spec.download.progress);
    Ok(())
}

fn run_checkpoint_path(args: CheckpointPathArgs) -> cuaderno::Result<()> {
    let path = PathTemplate::new(args.template).format(args.epoch)?;
    println!("{}", path.display());
    Ok(())
}
