//! Per-file failures that the batch reports instead of aborting on.

use std::path::PathBuf;
use thiserror::Error;

/// The relocate primitive failed for one subtitle.
#[derive(Debug, Error)]
pub enum RelocationError {
    #[error("Failed to move {source_path} to {destination}")]
    MoveFailed {
        source_path: PathBuf,
        destination: PathBuf,
        #[source]
        error: std::io::Error,
    },

    #[error("Failed to remove {source_path} (destination {destination} already exists)")]
    RemoveFailed {
        source_path: PathBuf,
        destination: PathBuf,
        #[source]
        error: std::io::Error,
    },
}

impl RelocationError {
    pub fn move_failed(source_path: PathBuf, destination: PathBuf, error: std::io::Error) -> Self {
        Self::MoveFailed {
            source_path,
            destination,
            error,
        }
    }

    pub fn remove_failed(source_path: PathBuf, destination: PathBuf, error: std::io::Error) -> Self {
        Self::RemoveFailed {
            source_path,
            destination,
            error,
        }
    }
}

/// A subtitle pack could not be unpacked; nothing inside it is processed.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported pack format: {path}")]
    UnsupportedFormat { path: PathBuf },

    #[error("Failed to run {tool}. Is it installed?")]
    ToolUnavailable {
        tool: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} failed on {path}: {stderr}")]
    ToolFailed {
        tool: &'static str,
        path: PathBuf,
        stderr: String,
    },

    #[error("I/O error while extracting: {0}")]
    Io(#[from] std::io::Error),
}
