//! Error types for prioboard.
//!
//! Unknown identifiers are not errors: mutating or removing a task or priority
//! that no longer exists is a silent no-op. Malformed stored payloads are not
//! errors either; they are logged and replaced by an empty or default mapping.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for store and storage operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Task title cannot be empty")]
    EmptyTitle,

    #[error("Priority name cannot be empty")]
    EmptyName,

    #[error("No {kind} matches '{needle}'")]
    NotFound { kind: &'static str, needle: String },

    #[error("'{needle}' matches {count} {kind}s; use a longer prefix")]
    Ambiguous {
        kind: &'static str,
        needle: String,
        count: usize,
    },

    #[error("Cannot use data directory {path}: {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
