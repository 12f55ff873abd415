//! Local filesystem storage adapter
//!
//! A uniform contract for CRUD, listing and metadata operations over a storage
//! medium ([`adapter::Adapter`]), implemented for a directory on the local disk
//! ([`adapter::LocalAdapter`]).

pub mod adapter;
pub mod config;
pub mod error;
pub mod storage;
pub mod utils;

pub use adapter::{Adapter, LocalAdapter, WriteConfig};
pub use config::AdapterSettings;
pub use error::{Result, StorageError};
pub use storage::{EntryKind, LinkPolicy, Metadata, PermissionTable, Visibility, WriteFlags};
