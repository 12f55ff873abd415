//! Visibility mapping
//!
//! Maps the two-valued public/private visibility onto permission bits,
//! separately for files and directories.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::StorageError;
use crate::storage::metadata::EntryKind;

/// Group and other read bits; any of them set makes an entry public.
const PUBLIC_READ_MASK: u32 = 0o044;

/// Visibility of a stored entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Visibility {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Visibility::Public),
            "private" => Ok(Visibility::Private),
            other => Err(StorageError::InvalidVisibility(other.to_string())),
        }
    }
}

/// Permission bits for one entry kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PermissionPair {
    pub public: u32,
    pub private: u32,
}

/// The 2x2 table of permission bits indexed by entry kind and visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PermissionTable {
    pub file: PermissionPair,
    pub dir: PermissionPair,
}

impl Default for PermissionTable {
    fn default() -> Self {
        Self {
            file: PermissionPair {
                public: 0o744,
                private: 0o700,
            },
            dir: PermissionPair {
                public: 0o755,
                private: 0o700,
            },
        }
    }
}

impl PermissionTable {
    /// Returns the permission bits to apply for `visibility` on an entry of `kind`.
    pub fn permissions_for(&self, kind: EntryKind, visibility: Visibility) -> u32 {
        let pair = match kind {
            EntryKind::File => &self.file,
            EntryKind::Dir => &self.dir,
        };
        match visibility {
            Visibility::Public => pair.public,
            Visibility::Private => pair.private,
        }
    }

    /// Classifies existing permission bits.
    ///
    /// The reverse mapping is lossy: anything readable by group or others is
    /// public, everything else is private. `kind` does not change the outcome
    /// but keeps the call symmetric with [`PermissionTable::permissions_for`].
    pub fn visibility_for(&self, _kind: EntryKind, permissions: u32) -> Visibility {
        if permissions & PUBLIC_READ_MASK != 0 {
            Visibility::Public
        } else {
            Visibility::Private
        }
    }

    /// Returns the first value that does not fit into permission bits, if any.
    pub fn invalid_value(&self) -> Option<u32> {
        [
            self.file.public,
            self.file.private,
            self.dir.public,
            self.dir.private,
        ]
        .into_iter()
        .find(|mode| *mode > 0o7777)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let table = PermissionTable::default();
        assert_eq!(table.permissions_for(EntryKind::File, Visibility::Public), 0o744);
        assert_eq!(table.permissions_for(EntryKind::File, Visibility::Private), 0o700);
        assert_eq!(table.permissions_for(EntryKind::Dir, Visibility::Public), 0o755);
        assert_eq!(table.permissions_for(EntryKind::Dir, Visibility::Private), 0o700);
    }

    #[test]
    fn test_visibility_round_trip() {
        let table = PermissionTable::default();
        for kind in [EntryKind::File, EntryKind::Dir] {
            for visibility in [Visibility::Public, Visibility::Private] {
                let bits = table.permissions_for(kind, visibility);
                assert_eq!(table.visibility_for(kind, bits), visibility);
            }
        }
    }

    #[test]
    fn test_reverse_mapping_is_lossy() {
        let table = PermissionTable::default();
        assert_eq!(table.visibility_for(EntryKind::File, 0o604), Visibility::Public);
        assert_eq!(table.visibility_for(EntryKind::File, 0o640), Visibility::Public);
        assert_eq!(table.visibility_for(EntryKind::File, 0o711), Visibility::Private);
        assert_eq!(table.visibility_for(EntryKind::Dir, 0o000), Visibility::Private);
    }

    #[test]
    fn test_visibility_parsing() {
        assert_eq!("public".parse::<Visibility>().unwrap(), Visibility::Public);
        assert_eq!("private".parse::<Visibility>().unwrap(), Visibility::Private);
        assert!(matches!(
            "hidden".parse::<Visibility>(),
            Err(StorageError::InvalidVisibility(v)) if v == "hidden"
        ));
    }

    #[test]
    fn test_invalid_value() {
        let mut table = PermissionTable::default();
        assert_eq!(table.invalid_value(), None);
        table.dir.private = 0o17777;
        assert_eq!(table.invalid_value(), Some(0o17777));
    }
}
