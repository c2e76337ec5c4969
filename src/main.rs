//! # pb - prioboard CLI
//!
//! Terminal front end for the local task board.
//!
//! ## Quick Start
//!
//! ```bash
//! # Add a task (medium priority by default)
//! pb add "Water the plants"
//!
//! # Add an urgent one
//! pb add "Renew passport" --priority high
//!
//! # List: open first, then by priority, newest first
//! pb list
//!
//! # Complete by ID prefix
//! pb done 3f2a
//!
//! # Manage priorities
//! pb prio add "Someday" --color "#e0e7ff"
//! pb prio list
//! ```
//!
//! Data is stored in `~/.prioboard/` (override with `--dir` or `PRIOBOARD_DIR`).
//! Set `RUST_LOG=debug` to see storage activity.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use prioboard::cli::Cli;
use prioboard::cmd;
use prioboard::config::prepare_data_dir;
use prioboard::{Board, FileStorage};

fn main() {
    // Warnings (e.g. a corrupt store that was reset) are shown by default.
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|raw| {
            let raw = raw.trim();
            if raw.is_empty() {
                return None;
            }
            EnvFilter::try_new(raw).ok()
        })
        .unwrap_or_else(|| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let cli = Cli::parse();

    let dir = match prepare_data_dir(cli.dir.as_deref()) {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let mut board = Board::open(FileStorage::new(dir));
    if let Err(e) = cmd::run(&mut board, cli.command) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
