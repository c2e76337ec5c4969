//! Data directory resolution.
//!
//! The board lives in one directory with one file per storage key. It is taken
//! from `--dir`, then `PRIOBOARD_DIR`, then `$HOME/.prioboard`.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Directory name used under `$HOME`.
pub const DEFAULT_DIR_NAME: &str = ".prioboard";

/// `$HOME/.prioboard`, or `./.prioboard` when `HOME` is unset.
pub fn default_data_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(DEFAULT_DIR_NAME)
}

/// Pick the data directory and make sure it exists.
pub fn prepare_data_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    let dir = explicit.map(Path::to_path_buf).unwrap_or_else(default_data_dir);
    fs::create_dir_all(&dir).map_err(|source| Error::DataDir {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}
