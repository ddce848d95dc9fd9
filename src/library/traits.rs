//! Storage traits and error types
//!
//! This module defines the filesystem capability the library is built on.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to move {} into place: {source}", path.display())]
    Persist {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid path: {}", .0.display())]
    InvalidPath(PathBuf),
}

impl StorageError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// File presence is the dedup signal for every later run, so `write_file`
/// must never leave a partially written file at `path`.
pub trait Storage: Send + Sync {
    /// Returns true if a file or directory exists at `path`
    fn exists(&self, path: &Path) -> bool;

    /// Creates `path` and all missing parents
    fn make_dirs(&self, path: &Path) -> StorageResult<()>;

    /// Writes `bytes` to `path`, replacing any existing file in one step
    fn write_file(&self, path: &Path, bytes: &[u8]) -> StorageResult<()>;

    /// Reads a text file
    ///
    /// # Returns
    ///
    /// * `Ok(Some(text))` - The file content
    /// * `Ok(None)` - No file at `path`
    /// * `Err(StorageError)` - The file exists but could not be read
    fn read_text(&self, path: &Path) -> StorageResult<Option<String>>;

    /// Lists the directories directly under `path`, sorted by name
    ///
    /// A missing `path` lists as empty.
    fn list_dirs(&self, path: &Path) -> StorageResult<Vec<PathBuf>>;
}
