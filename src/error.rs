//! Storage error types

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by key-value store backends.
///
/// Gameplay code never propagates these past the session boundary; they are
/// logged and the game keeps running on in-memory state.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read save file {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to write save file {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("save file {path} is not a valid envelope: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("save file {path} has unsupported version {found} (expected {expected})")]
    UnsupportedVersion {
        path: PathBuf,
        found: u32,
        expected: u32,
    },
    #[error("failed to encode store contents: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("browser storage is unavailable")]
    Unavailable,
    #[error("browser storage rejected key {key}")]
    Rejected { key: String },
}
