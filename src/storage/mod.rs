//! File system storage management
//!
//! Path resolution under the root, visibility and permission mapping, metadata
//! normalization and directory traversal.

pub mod filesystem;
pub mod metadata;
pub mod prefixer;
pub mod traversal;
pub mod umask;
pub mod visibility;

// Re-export commonly used types
pub use filesystem::WriteFlags;
pub use metadata::{EntryKind, LinkPolicy, Metadata, MetadataMapper, Normalized};
pub use prefixer::PathPrefixer;
pub use visibility::{PermissionPair, PermissionTable, Visibility};
