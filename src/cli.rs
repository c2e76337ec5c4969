use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Local task board with user-defined priorities.
/// Storage defaults to ~/.prioboard or a directory passed via --dir.
#[derive(Parser)]
#[command(name = "pb", version, about = "Local task board with priorities")]
pub struct Cli {
    /// Directory holding the board's storage files.
    #[arg(long, global = true, env = "PRIOBOARD_DIR")]
    pub dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}
