//! Error types for the explorer core

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by navigation, clipboard and file operations.
///
/// None of these are fatal: listing errors replace the displayed content
/// with a retryable message, per-item batch errors are aggregated by the
/// caller, and paste conflicts are reported as outcomes, not errors.
#[derive(Debug, Error)]
pub enum ExplorerError {
    /// The target of a navigation does not exist.
    #[error("path does not exist: {0}")]
    PathNotFound(PathBuf),

    /// Enumerating a directory failed (permissions, I/O).
    #[error("failed to list {path}: {source}")]
    ListingFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Paste was requested with an empty clipboard.
    #[error("nothing to paste")]
    NothingToPaste,

    /// A single copy/move/delete/rename/create failed. Never aborts a
    /// batch; recorded and surfaced per item.
    #[error("operation failed on {path}: {message}")]
    ItemOperationFailed { path: PathBuf, message: String },

    /// System clipboard access failed.
    #[error("clipboard error: {0}")]
    Clipboard(String),

    /// Settings could not be read or written.
    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ExplorerError>;

impl ExplorerError {
    pub(crate) fn item_failed(path: &std::path::Path, err: impl std::fmt::Display) -> Self {
        ExplorerError::ItemOperationFailed {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}
