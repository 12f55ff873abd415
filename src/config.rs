//! Configuration management for the local storage adapter
//!
//! Construction parameters are read from a TOML file and can be overridden with
//! environment variables prefixed `RAX_FS`, using `__` as the nesting separator
//! (e.g. `RAX_FS__ROOT=/srv/data`, `RAX_FS__PERMISSIONS__FILE__PUBLIC=420`).

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::storage::{LinkPolicy, PermissionTable, WriteFlags};

/// Default location of the settings file, without extension.
pub const DEFAULT_CONFIG_PATH: &str = "config";

/// Environment variable prefix for overrides.
pub const ENV_PREFIX: &str = "RAX_FS";

/// Settings used to construct a [`crate::adapter::LocalAdapter`]
#[derive(Debug, Deserialize, Clone)]
pub struct AdapterSettings {
    /// Root directory all adapter paths are resolved against
    pub root: String,

    /// Lock destination files exclusively while writing
    #[serde(default = "default_exclusive_lock")]
    pub exclusive_lock: bool,

    /// Behaviour when a symbolic link is encountered
    #[serde(default)]
    pub links: LinkPolicy,

    /// Permission bits per entry kind and visibility
    #[serde(default)]
    pub permissions: PermissionTable,
}

fn default_exclusive_lock() -> bool {
    true
}

impl AdapterSettings {
    /// Load settings from `config.toml` in the working directory with environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        Self::build(File::with_name(DEFAULT_CONFIG_PATH).required(false))
    }

    /// Load settings from an explicit file with environment overrides
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::build(File::from(path.as_ref()))
    }

    fn build<S>(file: S) -> Result<Self, ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let settings = Config::builder()
            .add_source(file)
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;
        let settings: AdapterSettings = settings.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validation for all configuration values
    fn validate(&self) -> Result<(), ConfigError> {
        if self.root.trim().is_empty() {
            return Err(ConfigError::Message("root cannot be empty".into()));
        }

        if let Some(mode) = self.permissions.invalid_value() {
            return Err(ConfigError::Message(format!(
                "permission value {mode:o} is not a valid mode"
            )));
        }

        Ok(())
    }

    /// Get root as PathBuf
    pub fn root_path(&self) -> PathBuf {
        PathBuf::from(&self.root)
    }

    pub fn write_flags(&self) -> WriteFlags {
        WriteFlags {
            exclusive_lock: self.exclusive_lock,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{EntryKind, Visibility};
    use std::fs;
    use tempfile::TempDir;

    fn write_settings(temp: &TempDir, body: &str) -> PathBuf {
        let path = temp.path().join("adapter.toml");
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_defaults() {
        let temp = TempDir::new().unwrap();
        let path = write_settings(&temp, "root = \"/srv/storage\"\n");

        let settings = AdapterSettings::load_from(&path).unwrap();
        assert_eq!(settings.root_path(), PathBuf::from("/srv/storage"));
        assert!(settings.write_flags().exclusive_lock);
        assert_eq!(settings.links, LinkPolicy::DisallowLinks);
        assert_eq!(settings.permissions, PermissionTable::default());
    }

    #[test]
    fn test_overrides() {
        let temp = TempDir::new().unwrap();
        let path = write_settings(
            &temp,
            r#"
root = "/data"
exclusive_lock = false
links = "skip_links"

[permissions.file]
public = 0o644
private = 0o600
"#,
        );

        let settings = AdapterSettings::load_from(&path).unwrap();
        assert!(!settings.write_flags().exclusive_lock);
        assert_eq!(settings.links, LinkPolicy::SkipLinks);
        assert_eq!(
            settings.permissions.permissions_for(EntryKind::File, Visibility::Public),
            0o644
        );
        assert_eq!(
            settings.permissions.permissions_for(EntryKind::Dir, Visibility::Public),
            0o755
        );
    }

    #[test]
    fn test_rejects_empty_root() {
        let temp = TempDir::new().unwrap();
        let path = write_settings(&temp, "root = \"  \"\n");
        assert!(AdapterSettings::load_from(&path).is_err());
    }

    #[test]
    fn test_rejects_oversized_mode() {
        let temp = TempDir::new().unwrap();
        let path = write_settings(
            &temp,
            "root = \"/data\"\n[permissions.dir]\npublic = 0o77777\nprivate = 0o700\n",
        );
        assert!(AdapterSettings::load_from(&path).is_err());
    }
}
