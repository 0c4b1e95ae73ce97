//! Error type shared by every pipeline component.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Required input not found: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("Malformed {what}: {reason}")]
    Malformed { what: String, reason: String },

    #[error("Invalid installation at {}: missing {missing}", path.display())]
    InvalidInstallation { path: PathBuf, missing: String },

    #[error("{command} failed: {reason}")]
    ProcessFailed { command: String, reason: String },

    #[error("Conversion of {} failed: {reason}", path.display())]
    Conversion { path: PathBuf, reason: String },
}

pub type Result<T> = std::result::Result<T, PipelineError>;
