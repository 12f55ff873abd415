//! Directory traversal
//!
//! Flat and recursive listings (self-first) and recursive removal (children-first).
//!
//! Sibling order follows the filesystem's iteration order and is not stable
//! across runs or platforms. Only the parent/child ordering is guaranteed.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info};
use walkdir::WalkDir;

use crate::error::{Result, StorageError};
use crate::storage::metadata::{EntryKind, Metadata, MetadataMapper, Normalized};

/// One step of a recursive removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal {
    pub location: PathBuf,
    pub kind: EntryKind,
}

/// Returns true when the last segment of `path` is `.` or `..`.
pub fn is_dot_entry(path: &str) -> bool {
    let last = path.rsplit(['/', '\\']).next().unwrap_or(path);
    last == "." || last == ".."
}

/// Lists the entries below `location`.
///
/// A missing location, or one that is not a directory, yields an empty listing.
/// Entries that disappear while the listing runs are omitted. In recursive mode a directory's own entry precedes its descendants. Links are
/// never followed; how they are reported depends on the mapper's link policy, and a
/// disallowed link aborts the whole listing.
pub fn list_contents(
    mapper: &MetadataMapper,
    location: &Path,
    recursive: bool,
) -> Result<Vec<Metadata>> {
    if !location.is_dir() {
        debug!("Nothing to list at {}", location.display());
        return Ok(Vec::new());
    }

    let walker = WalkDir::new(location).min_depth(1).follow_links(false);
    let walker = if recursive { walker } else { walker.max_depth(1) };

    let mut listing = Vec::new();
    for entry in walker {
        // Entries removed while the walk is running are left out.
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if is_not_found(&e) => {
                debug!("Vanished during listing: {:?}", e.path());
                continue;
            }
            Err(e) => return Err(walk_error(mapper, location, e)),
        };

        let path = mapper.relative_path(entry.path());
        if is_dot_entry(&path) {
            continue;
        }

        let metadata = match entry.metadata() {
            Ok(metadata) => metadata,
            Err(e) if is_not_found(&e) => {
                debug!("Vanished during listing: {path}");
                continue;
            }
            Err(e) => return Err(walk_error(mapper, location, e)),
        };
        match mapper.normalize(entry.path(), &metadata)? {
            Normalized::Entry(record) => listing.push(record),
            Normalized::Skipped => {}
        }
    }

    Ok(listing)
}

/// Computes the order in which [`delete_tree`] removes entries: every descendant
/// of a directory comes before the directory, and `location` itself comes last.
pub fn removal_plan(location: &Path) -> io::Result<Vec<Removal>> {
    let mut plan = Vec::new();
    for entry in WalkDir::new(location).contents_first(true).follow_links(false) {
        let entry = entry.map_err(io::Error::from)?;
        let kind = if entry.file_type().is_dir() {
            EntryKind::Dir
        } else {
            EntryKind::File
        };
        plan.push(Removal {
            location: entry.into_path(),
            kind,
        });
    }
    Ok(plan)
}

/// Removes `location` and everything below it.
///
/// Fails with [`StorageError::NotADirectory`] without touching anything when
/// `location` is not a directory. A failure part-way leaves already removed
/// entries removed. Returns the number of entries removed.
pub fn delete_tree(mapper: &MetadataMapper, location: &Path) -> Result<usize> {
    let path = mapper.relative_path(location);
    let is_dir = fs::symlink_metadata(location)
        .map(|m| m.is_dir())
        .unwrap_or(false);
    if !is_dir {
        return Err(StorageError::NotADirectory(path));
    }

    let plan = removal_plan(location).map_err(|e| StorageError::from_io(&path, e))?;
    for removal in &plan {
        let removed = match removal.kind {
            EntryKind::Dir => fs::remove_dir(&removal.location),
            // Links are unlinked, never followed.
            EntryKind::File => fs::remove_file(&removal.location),
        };
        removed.map_err(|e| StorageError::from_io(&mapper.relative_path(&removal.location), e))?;
        debug!("Removed {}", removal.location.display());
    }

    info!("Deleted directory {path} ({} entries)", plan.len());
    Ok(plan.len())
}

fn is_not_found(error: &walkdir::Error) -> bool {
    error
        .io_error()
        .is_some_and(|e| e.kind() == io::ErrorKind::NotFound)
}

fn walk_error(mapper: &MetadataMapper, location: &Path, error: walkdir::Error) -> StorageError {
    let path = mapper.relative_path(error.path().unwrap_or(location));
    StorageError::from_io(&path, io::Error::from(error))
}
