//! Error types
//!
//! Defines the error type shared by every storage operation of the adapter.

use std::io;

use thiserror::Error;

/// Result alias used across the adapter.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Storage adapter errors
///
/// Paths carried by the variants are adapter-relative unless noted otherwise.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The root directory could not be created, resolved or read (absolute path).
    #[error("Root directory unavailable: {root} ({reason})")]
    RootUnavailable { root: String, reason: String },

    /// A symbolic link was found while links are disallowed.
    #[error("Links are not supported, encountered link at {0}")]
    UnsupportedLink(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("Not a file: {0}")]
    NotAFile(String),

    /// A visibility value other than `public` or `private`.
    #[error("Invalid visibility: {0}")]
    InvalidVisibility(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

impl StorageError {
    /// Maps an OS error raised while operating on `path`.
    ///
    /// Missing entries are reported as [`StorageError::NotFound`] so callers can
    /// tell them apart from other OS failures.
    pub fn from_io(path: &str, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => StorageError::NotFound(path.to_string()),
            _ => StorageError::Io {
                path: path.to_string(),
                source: error,
            },
        }
    }

    pub(crate) fn root_unavailable(root: &std::path::Path, reason: impl ToString) -> Self {
        StorageError::RootUnavailable {
            root: root.display().to_string(),
            reason: reason.to_string(),
        }
    }
}
