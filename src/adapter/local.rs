//! Local filesystem adapter
//!
//! Implements [`Adapter`] for a directory tree on the local disk. Every path is
//! resolved under a fixed root; nothing is cached between calls.

use std::fmt;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::adapter::mime::{ContentSniffer, MimeTypeDetector};
use crate::adapter::options::WriteConfig;
use crate::adapter::results::{
    DirectoryResult, MimetypeResult, ReadResult, ReadStreamResult, VisibilityResult, WriteResult,
};
use crate::adapter::Adapter;
use crate::config::AdapterSettings;
use crate::error::{Result, StorageError};
use crate::storage::filesystem::{self, WriteFlags};
use crate::storage::umask;
use crate::storage::{
    EntryKind, LinkPolicy, Metadata, MetadataMapper, PathPrefixer, PermissionTable, Visibility,
    traversal,
};

/// Bytes handed to the MIME detector by [`Adapter::get_mimetype`].
const MIME_SNIFF_LEN: u64 = 8192;

/// Storage adapter over a local directory.
pub struct LocalAdapter {
    prefixer: PathPrefixer,
    mapper: MetadataMapper,
    permissions: PermissionTable,
    write_flags: WriteFlags,
    mime: Box<dyn MimeTypeDetector>,
}

impl fmt::Debug for LocalAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalAdapter")
            .field("root", &self.prefixer.root())
            .field("link_policy", &self.mapper.link_policy())
            .field("permissions", &self.permissions)
            .field("write_flags", &self.write_flags)
            .finish_non_exhaustive()
    }
}

impl LocalAdapter {
    /// Creates an adapter rooted at `root`.
    ///
    /// A missing root is created with the public directory mode. The root is then
    /// resolved to its canonical form and must be a readable directory.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::RootUnavailable`] when the root cannot be created,
    /// resolved or read.
    pub fn new(
        root: impl AsRef<Path>,
        write_flags: WriteFlags,
        link_policy: LinkPolicy,
        permissions: PermissionTable,
    ) -> Result<Self> {
        let root = root.as_ref();
        let dir_mode = permissions.permissions_for(EntryKind::Dir, Visibility::Public);
        filesystem::ensure_directory(root, dir_mode)
            .map_err(|e| StorageError::root_unavailable(root, format!("cannot create: {e}")))?;

        let root = root
            .canonicalize()
            .map_err(|e| StorageError::root_unavailable(root, format!("cannot resolve: {e}")))?;
        fs::read_dir(&root)
            .map_err(|e| StorageError::root_unavailable(&root, format!("not readable: {e}")))?;

        info!(
            "Local adapter rooted at {} (links: {:?}, exclusive lock: {})",
            root.display(),
            link_policy,
            write_flags.exclusive_lock
        );

        let prefixer = PathPrefixer::new(root);
        Ok(Self {
            mapper: MetadataMapper::new(prefixer.clone(), link_policy),
            prefixer,
            permissions,
            write_flags,
            mime: Box::new(ContentSniffer),
        })
    }

    /// Creates an adapter with locked writes, disallowed links and the default
    /// permission table.
    pub fn with_defaults(root: impl AsRef<Path>) -> Result<Self> {
        Self::new(
            root,
            WriteFlags::default(),
            LinkPolicy::default(),
            PermissionTable::default(),
        )
    }

    /// Creates an adapter from loaded settings.
    pub fn from_settings(settings: &AdapterSettings) -> Result<Self> {
        Self::new(
            settings.root_path(),
            settings.write_flags(),
            settings.links,
            settings.permissions,
        )
    }

    /// Replaces the MIME type detector.
    pub fn with_mime_detector(mut self, detector: impl MimeTypeDetector + 'static) -> Self {
        self.mime = Box::new(detector);
        self
    }

    /// The resolved root directory.
    pub fn root(&self) -> &Path {
        self.prefixer.root()
    }

    fn resolve(&self, path: &str) -> (PathBuf, String) {
        let location = self.prefixer.apply_prefix(path);
        let relative = self.prefixer.remove_prefix(&location);
        (location, relative)
    }

    fn failure(&self, operation: &str, path: &str, error: io::Error) -> StorageError {
        warn!("{operation} failed for {path:?}: {error}");
        StorageError::from_io(path, error)
    }

    /// Creates the parent of `location` with the public directory mode if needed.
    fn ensure_parent(&self, location: &Path) -> Result<()> {
        let Some(parent) = location.parent() else {
            return Ok(());
        };
        let mode = self
            .permissions
            .permissions_for(EntryKind::Dir, Visibility::Public);
        filesystem::ensure_directory(parent, mode).map_err(|e| {
            self.failure("create directory", &self.prefixer.remove_prefix(parent), e)
        })
    }

    fn write_contents(
        &self,
        path: &str,
        contents: &[u8],
        config: &WriteConfig,
        guess_mimetype: bool,
    ) -> Result<WriteResult> {
        let visibility = config.visibility()?;
        let (location, relative) = self.resolve(path);
        self.ensure_parent(&location)?;

        let size = filesystem::write_file(&location, contents, self.write_flags)
            .map_err(|e| self.failure("write", &relative, e))?;
        let mimetype = guess_mimetype.then(|| self.mime.detect(&location, contents));

        self.finish_write(relative, visibility, Some(size), mimetype)
    }

    fn write_from(
        &self,
        path: &str,
        source: &mut dyn Read,
        config: &WriteConfig,
    ) -> Result<WriteResult> {
        let visibility = config.visibility()?;
        let (location, relative) = self.resolve(path);
        self.ensure_parent(&location)?;

        filesystem::write_stream(&location, source, self.write_flags)
            .map_err(|e| self.failure("write stream", &relative, e))?;

        self.finish_write(relative, visibility, None, None)
    }

    /// Applies a requested visibility as a separate step once the bytes are on disk.
    fn finish_write(
        &self,
        relative: String,
        visibility: Option<Visibility>,
        size: Option<u64>,
        mimetype: Option<String>,
    ) -> Result<WriteResult> {
        if let Some(visibility) = visibility {
            self.set_visibility(&relative, visibility)?;
        }
        info!("Wrote {relative}");
        Ok(WriteResult {
            kind: EntryKind::File,
            path: relative,
            size,
            visibility,
            mimetype,
        })
    }
}

impl Adapter for LocalAdapter {
    fn has(&self, path: &str) -> bool {
        self.prefixer.apply_prefix(path).exists()
    }

    fn write(&self, path: &str, contents: &[u8], config: &WriteConfig) -> Result<WriteResult> {
        self.write_contents(path, contents, config, false)
    }

    fn write_stream(
        &self,
        path: &str,
        source: &mut dyn Read,
        config: &WriteConfig,
    ) -> Result<WriteResult> {
        self.write_from(path, source, config)
    }

    fn update(&self, path: &str, contents: &[u8], config: &WriteConfig) -> Result<WriteResult> {
        self.write_contents(path, contents, config, true)
    }

    fn update_stream(
        &self,
        path: &str,
        source: &mut dyn Read,
        config: &WriteConfig,
    ) -> Result<WriteResult> {
        self.write_from(path, source, config)
    }

    fn read(&self, path: &str) -> Result<ReadResult> {
        let (location, relative) = self.resolve(path);
        let contents = fs::read(&location).map_err(|e| self.failure("read", &relative, e))?;
        Ok(ReadResult {
            path: relative,
            contents,
        })
    }

    fn read_stream(&self, path: &str) -> Result<ReadStreamResult> {
        let (location, relative) = self.resolve(path);
        let file = File::open(&location).map_err(|e| self.failure("open", &relative, e))?;
        Ok(ReadStreamResult {
            path: relative,
            stream: Box::new(file),
        })
    }

    fn rename(&self, path: &str, new_path: &str) -> Result<()> {
        let (from, relative) = self.resolve(path);
        let (to, new_relative) = self.resolve(new_path);
        self.ensure_parent(&to)?;
        fs::rename(&from, &to).map_err(|e| self.failure("rename", &relative, e))?;
        info!("Renamed {relative} to {new_relative}");
        Ok(())
    }

    fn copy(&self, path: &str, new_path: &str) -> Result<()> {
        let (from, relative) = self.resolve(path);
        let (to, new_relative) = self.resolve(new_path);
        self.ensure_parent(&to)?;
        {
            let _creating = umask::hold();
            fs::copy(&from, &to).map_err(|e| self.failure("copy", &relative, e))?;
        }
        info!("Copied {relative} to {new_relative}");
        Ok(())
    }

    fn delete(&self, path: &str) -> Result<()> {
        let (location, relative) = self.resolve(path);
        fs::remove_file(&location).map_err(|e| self.failure("delete", &relative, e))?;
        info!("Deleted {relative}");
        Ok(())
    }

    fn delete_dir(&self, dirname: &str) -> Result<()> {
        let location = self.prefixer.apply_prefix(dirname);
        traversal::delete_tree(&self.mapper, &location).map(|_| ())
    }

    fn create_dir(&self, dirname: &str, config: &WriteConfig) -> Result<DirectoryResult> {
        let visibility = config.visibility()?.unwrap_or(Visibility::Public);
        let (location, relative) = self.resolve(dirname);

        if !filesystem::directory_exists(&location) {
            let mode = self.permissions.permissions_for(EntryKind::Dir, visibility);
            filesystem::create_directory(&location, mode)
                .map_err(|e| self.failure("create directory", &relative, e))?;
            info!("Created directory {relative} ({visibility})");
        }

        Ok(DirectoryResult {
            path: relative,
            kind: EntryKind::Dir,
        })
    }

    fn list_contents(&self, directory: &str, recursive: bool) -> Result<Vec<Metadata>> {
        let location = self.prefixer.apply_prefix(directory);
        traversal::list_contents(&self.mapper, &location, recursive)
    }

    fn get_metadata(&self, path: &str) -> Result<Metadata> {
        self.mapper.describe(&self.prefixer.apply_prefix(path))
    }

    fn get_mimetype(&self, path: &str) -> Result<MimetypeResult> {
        let (location, relative) = self.resolve(path);
        let file = File::open(&location).map_err(|e| self.failure("open", &relative, e))?;
        let mut head = Vec::new();
        file.take(MIME_SNIFF_LEN)
            .read_to_end(&mut head)
            .map_err(|e| self.failure("read", &relative, e))?;

        Ok(MimetypeResult {
            mimetype: self.mime.detect(&location, &head),
            path: relative,
        })
    }

    fn get_visibility(&self, path: &str) -> Result<VisibilityResult> {
        let (location, relative) = self.resolve(path);
        let metadata = self.mapper.lookup(&location)?;
        let visibility = self.permissions.visibility_for(
            EntryKind::of(&metadata),
            filesystem::permission_bits(&metadata),
        );
        Ok(VisibilityResult {
            path: relative,
            visibility,
        })
    }

    fn set_visibility(&self, path: &str, visibility: Visibility) -> Result<VisibilityResult> {
        let (location, relative) = self.resolve(path);
        let metadata = self.mapper.lookup(&location)?;
        let mode = self
            .permissions
            .permissions_for(EntryKind::of(&metadata), visibility);
        filesystem::set_permission_bits(&location, mode)
            .map_err(|e| self.failure("chmod", &relative, e))?;
        Ok(VisibilityResult {
            path: relative,
            visibility,
        })
    }
}
