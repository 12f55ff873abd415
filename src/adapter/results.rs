//! Adapter result types
//!
//! Defines the records returned by adapter operations.

use std::fmt;
use std::io::Read;

use crate::storage::{EntryKind, Visibility};

/// Result of a write or update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteResult {
    pub kind: EntryKind,
    pub path: String,
    /// Bytes persisted; only reported for content writes.
    pub size: Option<u64>,
    /// Visibility applied after writing, when one was requested.
    pub visibility: Option<Visibility>,
    /// Guessed MIME type; only computed by content updates.
    pub mimetype: Option<String>,
}

/// Result of a full read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadResult {
    pub path: String,
    pub contents: Vec<u8>,
}

/// Result of opening a file for streaming reads
///
/// The caller owns `stream` and closes it by dropping it.
pub struct ReadStreamResult {
    pub path: String,
    pub stream: Box<dyn Read + Send>,
}

impl fmt::Debug for ReadStreamResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadStreamResult")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Result of a visibility query or change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilityResult {
    pub path: String,
    pub visibility: Visibility,
}

/// Result of a MIME type lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MimetypeResult {
    pub path: String,
    pub mimetype: String,
}

/// Result of creating a directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryResult {
    pub path: String,
    pub kind: EntryKind,
}
