//! Path prefixing
//!
//! Translates adapter-relative paths into locations under the root and back.
//! Everything here is a pure string/path transform; the filesystem is never touched.

use std::path::{Component, Path, PathBuf};

/// Joins adapter-relative paths onto a fixed root.
#[derive(Debug, Clone)]
pub struct PathPrefixer {
    root: PathBuf,
}

impl PathPrefixer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the root every path is resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves an adapter-relative path to an absolute location under the root.
    ///
    /// Both `/` and `\` are accepted as separators. `.` segments are dropped and
    /// `..` segments are resolved lexically without ever climbing above the root,
    /// so the result always lies inside it. An empty path maps to the root.
    pub fn apply_prefix(&self, path: &str) -> PathBuf {
        let mut location = self.root.clone();
        for segment in normalized_segments(path) {
            location.push(segment);
        }
        location
    }

    /// Converts an absolute location back into an adapter-relative path.
    ///
    /// The result uses forward slashes and carries no leading or trailing
    /// separator. The root itself maps to the empty string.
    pub fn remove_prefix(&self, location: &Path) -> String {
        match location.strip_prefix(&self.root) {
            Ok(relative) => relative
                .components()
                .filter_map(|component| match component {
                    Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
                    Component::CurDir => Some(".".to_string()),
                    Component::ParentDir => Some("..".to_string()),
                    Component::RootDir | Component::Prefix(_) => None,
                })
                .collect::<Vec<_>>()
                .join("/"),
            Err(_) => {
                // Not under the root as a path; fall back to a textual strip.
                let location = location.to_string_lossy();
                let root = self.root.to_string_lossy();
                location
                    .strip_prefix(root.as_ref())
                    .unwrap_or(&location)
                    .replace('\\', "/")
                    .trim_matches('/')
                    .to_string()
            }
        }
    }
}

/// Normalizes an adapter-relative path the same way [`PathPrefixer::apply_prefix`] does,
/// rendered with forward slashes.
pub fn normalize(path: &str) -> String {
    normalized_segments(path).join("/")
}

fn normalized_segments(path: &str) -> Vec<&str> {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            name => segments.push(name),
        }
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefixer() -> PathPrefixer {
        PathPrefixer::new("/srv/storage")
    }

    #[test]
    fn test_empty_path_maps_to_root() {
        assert_eq!(prefixer().apply_prefix(""), PathBuf::from("/srv/storage"));
        assert_eq!(prefixer().apply_prefix("/"), PathBuf::from("/srv/storage"));
    }

    #[test]
    fn test_apply_prefix_normalizes_separators() {
        let location = prefixer().apply_prefix("docs\\reports/2024.txt");
        assert_eq!(location, PathBuf::from("/srv/storage/docs/reports/2024.txt"));
    }

    #[test]
    fn test_parent_segments_never_escape_root() {
        let p = prefixer();
        assert_eq!(p.apply_prefix("../etc/passwd"), PathBuf::from("/srv/storage/etc/passwd"));
        assert_eq!(p.apply_prefix("a/../../b"), PathBuf::from("/srv/storage/b"));
        assert!(p.apply_prefix("../../..").starts_with(p.root()));
    }

    #[test]
    fn test_remove_prefix_strips_root_and_separators() {
        let p = prefixer();
        assert_eq!(p.remove_prefix(Path::new("/srv/storage/dir/file.txt")), "dir/file.txt");
        assert_eq!(p.remove_prefix(Path::new("/srv/storage/dir/")), "dir");
        assert_eq!(p.remove_prefix(Path::new("/srv/storage")), "");
    }

    #[test]
    fn test_round_trip() {
        let p = prefixer();
        for path in [
            "",
            "file.txt",
            "/leading/slash.txt",
            "trailing/dir/",
            "./current/./dir",
            "nested/../flattened",
            "back\\slashes\\here",
            "../outside",
        ] {
            assert_eq!(p.remove_prefix(&p.apply_prefix(path)), normalize(path), "path {path:?}");
        }
    }

    #[test]
    fn test_remove_prefix_keeps_dot_segments() {
        let p = prefixer();
        assert_eq!(p.remove_prefix(Path::new("/srv/storage/dir/..")), "dir/..");
    }
}
