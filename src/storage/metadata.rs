//! Metadata normalization
//!
//! Turns raw filesystem entries into the adapter's metadata records and enforces
//! the configured link policy while doing so.

use std::fs;
use std::path::Path;
use std::time::UNIX_EPOCH;

use log::{debug, warn};
use serde::Deserialize;

use crate::error::{Result, StorageError};
use crate::storage::prefixer::PathPrefixer;

/// Kind of a stored entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    File,
    Dir,
}

impl EntryKind {
    pub fn of(metadata: &fs::Metadata) -> Self {
        if metadata.is_dir() {
            EntryKind::Dir
        } else {
            EntryKind::File
        }
    }
}

/// What to do when a symbolic link is encountered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkPolicy {
    /// Leave links out of listings.
    SkipLinks,
    /// Fail with [`StorageError::UnsupportedLink`].
    #[default]
    DisallowLinks,
}

/// Normalized metadata of a single entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub kind: EntryKind,
    /// Adapter-relative, forward-slash separated.
    pub path: String,
    /// Modification time in seconds since the Unix epoch.
    pub timestamp: i64,
    /// Byte count, present for files only.
    pub size: Option<u64>,
}

/// Outcome of normalizing one raw entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalized {
    Entry(Metadata),
    /// The entry is deliberately left out (a link under [`LinkPolicy::SkipLinks`]).
    Skipped,
}

/// Builds [`Metadata`] records for entries under the root.
#[derive(Debug, Clone)]
pub struct MetadataMapper {
    prefixer: PathPrefixer,
    link_policy: LinkPolicy,
}

impl MetadataMapper {
    pub fn new(prefixer: PathPrefixer, link_policy: LinkPolicy) -> Self {
        Self {
            prefixer,
            link_policy,
        }
    }

    pub fn link_policy(&self) -> LinkPolicy {
        self.link_policy
    }

    /// Converts an absolute location into its adapter-relative path.
    pub fn relative_path(&self, location: &Path) -> String {
        self.prefixer.remove_prefix(location)
    }

    /// Normalizes an entry found while walking a directory.
    ///
    /// `metadata` must describe the entry itself, not a link target
    /// (as returned by `symlink_metadata`).
    pub fn normalize(&self, location: &Path, metadata: &fs::Metadata) -> Result<Normalized> {
        let path = self.relative_path(location);
        if metadata.file_type().is_symlink() {
            return match self.link_policy {
                LinkPolicy::DisallowLinks => {
                    warn!("Refusing link at {path}");
                    Err(StorageError::UnsupportedLink(path))
                }
                LinkPolicy::SkipLinks => {
                    debug!("Skipping link at {path}");
                    Ok(Normalized::Skipped)
                }
            };
        }
        Ok(Normalized::Entry(record(path, metadata)))
    }

    /// Looks up a single location and normalizes it.
    ///
    /// A link requested directly is resolved to its target when links are
    /// skipped, and refused when they are disallowed.
    pub fn describe(&self, location: &Path) -> Result<Metadata> {
        let metadata = self.lookup(location)?;
        Ok(record(self.relative_path(location), &metadata))
    }

    /// Raw metadata for a location requested directly, with the link policy applied.
    pub fn lookup(&self, location: &Path) -> Result<fs::Metadata> {
        let path = self.relative_path(location);
        let metadata =
            fs::symlink_metadata(location).map_err(|e| StorageError::from_io(&path, e))?;

        if !metadata.file_type().is_symlink() {
            return Ok(metadata);
        }

        match self.link_policy {
            LinkPolicy::DisallowLinks => {
                warn!("Refusing link at {path}");
                Err(StorageError::UnsupportedLink(path))
            }
            LinkPolicy::SkipLinks => {
                fs::metadata(location).map_err(|e| StorageError::from_io(&path, e))
            }
        }
    }
}

fn record(path: String, metadata: &fs::Metadata) -> Metadata {
    let kind = EntryKind::of(metadata);
    let size = match kind {
        EntryKind::File => Some(metadata.len()),
        EntryKind::Dir => None,
    };
    Metadata {
        kind,
        path,
        timestamp: modified_seconds(metadata),
        size,
    }
}

fn modified_seconds(metadata: &fs::Metadata) -> i64 {
    match metadata.modified() {
        Ok(time) => match time.duration_since(UNIX_EPOCH) {
            Ok(since) => since.as_secs() as i64,
            Err(before) => -(before.duration().as_secs() as i64),
        },
        Err(_) => 0,
    }
}
