//! # media-export: A CLI for `media-export`
//!
//! This is the main entry point for the `media-export` command-line interface.
//! It wires the Firestore store, the Cloud Storage uploader and the ffmpeg
//! thumbnail extractor into an `AutoSaver` and runs it over a batch file.

mod config;
mod save;

use anyhow::Result;
use clap::{Parser, Subcommand};
use save::{handle_save, SaveArgs};
use tracing_subscriber::{fmt, EnvFilter};

// --- CLI Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to a YAML config file. Defaults to ./config.yml when present.
    #[arg(long, global = true)]
    config: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Save metadata records for a batch of generated media
    Save(SaveArgs),
}

// --- Main Application Entry ---

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let config = config::get_config(cli.config.as_deref())?;

    match &cli.command {
        Commands::Save(args) => handle_save(args, &config).await,
    }
}
