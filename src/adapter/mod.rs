//! Storage adapter contract
//!
//! Every backend implements [`Adapter`]. Operations report failures through
//! [`crate::error::Result`]; only [`Adapter::has`] answers with a plain boolean.

pub mod local;
pub mod mime;
pub mod options;
pub mod results;

use std::io::Read;

use crate::error::{Result, StorageError};
use crate::storage::{Metadata, Visibility};

pub use local::LocalAdapter;
pub use mime::{ContentSniffer, MimeTypeDetector};
pub use options::{VISIBILITY_KEY, WriteConfig};
pub use results::{
    DirectoryResult, MimetypeResult, ReadResult, ReadStreamResult, VisibilityResult, WriteResult,
};

/// CRUD, listing and metadata operations over adapter-relative paths.
pub trait Adapter {
    /// Whether anything exists at `path`.
    fn has(&self, path: &str) -> bool;

    /// Writes `contents`, creating missing parent directories.
    fn write(&self, path: &str, contents: &[u8], config: &WriteConfig) -> Result<WriteResult>;

    /// Writes everything `source` yields, creating missing parent directories.
    fn write_stream(
        &self,
        path: &str,
        source: &mut dyn Read,
        config: &WriteConfig,
    ) -> Result<WriteResult>;

    /// Replaces the contents of `path`; also reports a MIME type guess.
    fn update(&self, path: &str, contents: &[u8], config: &WriteConfig) -> Result<WriteResult>;

    fn update_stream(
        &self,
        path: &str,
        source: &mut dyn Read,
        config: &WriteConfig,
    ) -> Result<WriteResult>;

    fn read(&self, path: &str) -> Result<ReadResult>;

    /// Opens `path` for reading; the returned stream belongs to the caller.
    fn read_stream(&self, path: &str) -> Result<ReadStreamResult>;

    fn rename(&self, path: &str, new_path: &str) -> Result<()>;

    fn copy(&self, path: &str, new_path: &str) -> Result<()>;

    fn delete(&self, path: &str) -> Result<()>;

    /// Removes a directory and everything below it.
    fn delete_dir(&self, dirname: &str) -> Result<()>;

    fn create_dir(&self, dirname: &str, config: &WriteConfig) -> Result<DirectoryResult>;

    /// Lists `directory` (empty for the root). Missing directories list as empty.
    fn list_contents(&self, directory: &str, recursive: bool) -> Result<Vec<Metadata>>;

    fn get_metadata(&self, path: &str) -> Result<Metadata>;

    /// Size in bytes; a projection of [`Adapter::get_metadata`].
    fn get_size(&self, path: &str) -> Result<u64> {
        let metadata = self.get_metadata(path)?;
        metadata.size.ok_or(StorageError::NotAFile(metadata.path))
    }

    /// Modification time; a projection of [`Adapter::get_metadata`].
    fn get_timestamp(&self, path: &str) -> Result<i64> {
        Ok(self.get_metadata(path)?.timestamp)
    }

    fn get_mimetype(&self, path: &str) -> Result<MimetypeResult>;

    fn get_visibility(&self, path: &str) -> Result<VisibilityResult>;

    fn set_visibility(&self, path: &str, visibility: Visibility) -> Result<VisibilityResult>;
}
