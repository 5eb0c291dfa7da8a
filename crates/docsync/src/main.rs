//! Docsync CLI - navigation synchronization for multi-language docs.
//!
//! Provides commands for:
//! - `sync`: Mirror source-language changes from a git commit range
//! - `apply`: Mirror a locally assembled list of added/deleted files

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ApplyArgs, SyncArgs};
use output::Output;

/// Docsync - Keep every language's navigation in step.
#[derive(Parser)]
#[command(name = "docsync", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Synchronize from a git commit range.
    Sync(SyncArgs),
    /// Synchronize from explicit file paths.
    Apply(ApplyArgs),
}

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let output = Output::new();

    let result = match cli.command {
        Commands::Sync(args) => args.execute(),
        Commands::Apply(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
