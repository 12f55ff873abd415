//! Error handlers
//!
//! Classifies storage errors and reports them to the log.

use crate::error::types::StorageError;
use log::error;

/// Failure classes a caller can act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The adapter could not be created; fatal for the caller.
    Construction,
    /// A configured policy refused the request (e.g. a disallowed link).
    PolicyViolation,
    /// A per-call failure; the adapter remains usable.
    Operation,
}

/// Log a storage error
pub fn handle_error(err: &StorageError) {
    error!("Storage error ({:?}): {}", error_category(err), err);
}

/// Convert error to its failure class
pub fn error_category(err: &StorageError) -> ErrorCategory {
    match err {
        StorageError::RootUnavailable { .. } => ErrorCategory::Construction,
        StorageError::UnsupportedLink(_) => ErrorCategory::PolicyViolation,
        StorageError::NotFound(_)
        | StorageError::NotADirectory(_)
        | StorageError::NotAFile(_)
        | StorageError::InvalidVisibility(_)
        | StorageError::Io { .. } => ErrorCategory::Operation,
    }
}
