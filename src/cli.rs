use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Focus-friendly mission manager.
/// Data lives in ~/.mewfocus or the directory passed via --data-dir.
#[derive(Parser)]
#[command(name = "mf", version, about = "ADHD-friendly mission manager with AI breakdowns")]
pub struct Cli {
    /// Directory holding the mission store.
    #[arg(long, global = true, env = "MEWFOCUS_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Gemini model used for breakdowns and voice parsing.
    #[arg(long, global = true, env = "MEWFOCUS_MODEL")]
    pub model: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}
