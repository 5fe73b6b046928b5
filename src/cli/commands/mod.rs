//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod check;
mod config_cmd;
mod process;
mod shell;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use docscan::{load_settings_with_options, LoadOptions};

#[derive(Parser)]
#[command(name = "docscan")]
#[command(about = "Scan photographed documents and extract their text")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Resolve relative paths from current working directory instead of config file location
    #[arg(long, global = true)]
    cwd: bool,

    /// Directory for corrected images (overrides config and DOCSCAN_OUTPUT_DIR)
    #[arg(short, long, global = true)]
    output_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Load, scan and extract an image, printing its text
    Process {
        /// Image to process (png, jpg, jpeg, bmp, tiff)
        image: PathBuf,
        /// Also save the text to this file
        #[arg(short, long)]
        save: Option<PathBuf>,
    },

    /// Load and scan an image, printing the corrected image's path
    Scan {
        /// Image to scan (png, jpg, jpeg, bmp, tiff)
        image: PathBuf,
    },

    /// Interactive session: load, scan, extract and save step by step
    Shell,

    /// Check that the corrector and recognizer are installed
    Check,

    /// Show the effective configuration
    Config,
}

/// Run pipeline work off the async runtime; every stage blocks.
async fn blocking<F>(work: F) -> anyhow::Result<()>
where
    F: FnOnce() -> anyhow::Result<()> + Send + 'static,
{
    tokio::task::spawn_blocking(work).await?
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
        use_cwd: cli.cwd,
        output_dir: cli.output_dir,
    };
    let (settings, config) = load_settings_with_options(options).await;

    match cli.command {
        Commands::Process { image, save } => {
            blocking(move || process::cmd_process(&settings, &image, save.as_deref())).await
        }
        Commands::Scan { image } => blocking(move || process::cmd_scan(&settings, &image)).await,
        Commands::Shell => blocking(move || shell::cmd_shell(&settings)).await,
        Commands::Check => check::cmd_check(&settings),
        Commands::Config => config_cmd::cmd_config(&settings, &config),
    }
}
