//! Drivesense control - CLI front end for the storage-health collector.
//!
//! Runs collections, lists collected reports, and shows one report. The
//! whole collection runs synchronously on this thread; the core blocks for
//! up to its wait timeout.

mod commands;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;

#[derive(Parser)]
#[command(name = "drivesensectl")]
#[command(about = "Storage health collection and history", long_about = None)]
#[command(version)]
struct Cli {
    /// Application base directory holding the bundled tool and log folder
    /// (defaults to the executable's directory)
    #[arg(long, global = true)]
    base_dir: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one collection with the bundled diagnostic tool
    Collect,

    /// List collected report artifacts, most recent first
    List,

    /// Show one report artifact
    Show {
        /// Artifact file name as printed by `list`
        file: String,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        })
        .init();

    let base_dir = match cli.base_dir {
        Some(dir) => dir,
        None => default_base_dir()?,
    };

    match cli.command {
        Commands::Collect => commands::collect(&base_dir),
        Commands::List => commands::list(&base_dir),
        Commands::Show { file, json } => commands::show(&base_dir, &file, json),
    }
}

/// Directory the executable lives in; the bundled tool and log folder ship
/// next to it. Falls back to the current directory.
fn default_base_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe()?;
    Ok(exe
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(".")))
}
