//! Library module for the local comic collection
//!
//! The library is a flat directory tree:
//!
//! ```text
//! <root>/<sanitized-series-title>/url.txt
//! <root>/<sanitized-series-title>/<sanitized-issue-title>.pdf
//! ```
//!
//! The only persisted state is the per-series origin sentinel and the
//! presence of issue files; both are accessed through the [`Storage`] trait.

mod local;
mod sanitize;
mod sentinel;
mod traits;

pub use local::LocalStorage;
pub use sanitize::{issue_file_name, sanitize, ISSUE_EXTENSION};
pub use sentinel::{read_origin, record_origin};
pub use traits::{Storage, StorageError, StorageResult};

use crate::config::LibraryConfig;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Handle on a library root
///
/// Cloning is cheap and clones share the storage backend.
#[derive(Clone)]
pub struct Library {
    root: PathBuf,
    sentinel_name: String,
    storage: Arc<dyn Storage>,
}

impl Library {
    pub fn new(config: &LibraryConfig, storage: Arc<dyn Storage>) -> Self {
        Self {
            root: PathBuf::from(&config.root),
            sentinel_name: config.sentinel_name.clone(),
            storage,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Folder of a series, named after its sanitized title
    pub fn series_dir(&self, series_title: &str) -> PathBuf {
        self.root.join(sanitize(series_title))
    }

    /// Every series folder under the root, sorted by name
    pub fn series_dirs(&self) -> StorageResult<Vec<PathBuf>> {
        self.storage.list_dirs(&self.root)
    }

    /// Returns true if an issue (or any file) already exists at `path`
    pub fn exists(&self, path: &Path) -> bool {
        self.storage.exists(path)
    }

    pub fn record_origin(&self, series_dir: &Path, url: &str) -> StorageResult<()> {
        record_origin(self.storage.as_ref(), series_dir, &self.sentinel_name, url)
    }

    pub fn read_origin(&self, series_dir: &Path) -> StorageResult<Option<String>> {
        read_origin(self.storage.as_ref(), series_dir, &self.sentinel_name)
    }
}

impl std::fmt::Debug for Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Library")
            .field("root", &self.root)
            .field("sentinel_name", &self.sentinel_name)
            .finish_non_exhaustive()
    }
}
