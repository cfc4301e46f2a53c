//! wrename - Rename FANZA and DLsite archives to `[maker] title.zip`.
//!
//! File names starting with `d_` are looked up from the FANZA affiliate API,
//! falling back to the FANZA detail page.
//! File names starting with `RJ` are looked up from the DLsite work page.

mod config;
mod rename;

use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::Shell;

use crate::config::Config;
use crate::rename::WorkRename;

#[derive(Parser)]
#[command(
    author,
    version,
    name = env!("CARGO_BIN_NAME"),
    about = "Rename FANZA and DLsite archives using catalog title and maker"
)]
pub(crate) struct Args {
    /// Input files or directories
    #[arg(value_hint = clap::ValueHint::AnyPath)]
    path: Vec<PathBuf>,

    /// Execute renaming (default only prints the new names).
    /// Existing target files are skipped unless --force is given
    #[arg(short = 'e', long)]
    execute: bool,

    /// Overwrite existing target files when renaming
    #[arg(short = 'f', long)]
    force: bool,

    /// Recurse into subdirectories
    #[arg(short = 'r', long)]
    recurse: bool,

    /// Path to the settings JSON with FANZA API credentials [default: settings.json]
    #[arg(short = 's', long, name = "SETTINGS", value_hint = clap::ValueHint::FilePath)]
    settings: Option<PathBuf>,

    /// Generate shell completion
    #[arg(short = 'l', long, name = "SHELL")]
    completion: Option<Shell>,

    /// Print verbose output
    #[arg(short = 'v', long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(ref shell) = args.completion {
        work_rename::generate_shell_completion(*shell, Args::command(), true, env!("CARGO_BIN_NAME"))
    } else {
        let config = Config::from_args(args)?;
        WorkRename::new(config)?.run().await
    }
}
