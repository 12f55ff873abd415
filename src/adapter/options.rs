//! Per-call options
//!
//! A generic key/value bag passed to write, update and directory creation.
//! The local adapter only reads the `visibility` key.

use std::collections::HashMap;

use crate::error::Result;
use crate::storage::Visibility;

/// Key holding the requested visibility.
pub const VISIBILITY_KEY: &str = "visibility";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteConfig {
    settings: HashMap<String, String>,
}

impl WriteConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a config carrying only a visibility.
    pub fn with_visibility(visibility: Visibility) -> Self {
        Self::new().with(VISIBILITY_KEY, visibility.as_str())
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.settings.get(key).map(String::as_str)
    }

    /// The requested visibility, if any.
    ///
    /// Fails with `InvalidVisibility` when the value is neither `public` nor `private`.
    pub fn visibility(&self) -> Result<Option<Visibility>> {
        self.get(VISIBILITY_KEY)
            .map(str::parse::<Visibility>)
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;

    #[test]
    fn test_visibility_absent() {
        assert_eq!(WriteConfig::new().visibility().unwrap(), None);
    }

    #[test]
    fn test_visibility_present() {
        let config = WriteConfig::with_visibility(Visibility::Private);
        assert_eq!(config.get(VISIBILITY_KEY), Some("private"));
        assert_eq!(config.visibility().unwrap(), Some(Visibility::Private));
    }

    #[test]
    fn test_unrecognised_keys_are_kept_but_ignored() {
        let config = WriteConfig::new().with("mimetype", "text/plain");
        assert_eq!(config.get("mimetype"), Some("text/plain"));
        assert_eq!(config.visibility().unwrap(), None);
    }

    #[test]
    fn test_invalid_visibility() {
        let config = WriteConfig::new().with(VISIBILITY_KEY, "world-readable");
        assert!(matches!(
            config.visibility(),
            Err(StorageError::InvalidVisibility(v)) if v == "world-readable"
        ));
    }
}
