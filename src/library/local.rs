//! Local filesystem storage

use crate::library::traits::{Storage, StorageError, StorageResult};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// [`Storage`] backed by the local filesystem
///
/// Files are written to a temporary sibling and renamed into place, so an
/// interrupted write never leaves a file at the destination.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

impl Storage for LocalStorage {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn make_dirs(&self, path: &Path) -> StorageResult<()> {
        std::fs::create_dir_all(path).map_err(|e| StorageError::io(path, e))
    }

    fn write_file(&self, path: &Path, bytes: &[u8]) -> StorageResult<()> {
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            Some(_) => Path::new("."),
            None => return Err(StorageError::InvalidPath(path.to_path_buf())),
        };
        if path.file_name().is_none() {
            return Err(StorageError::InvalidPath(path.to_path_buf()));
        }

        self.make_dirs(parent)?;

        let mut temp = NamedTempFile::new_in(parent).map_err(|e| StorageError::io(parent, e))?;
        temp.write_all(bytes)
            .and_then(|_| temp.as_file().sync_all())
            .map_err(|e| StorageError::io(temp.path(), e))?;

        temp.persist(path).map_err(|e| StorageError::Persist {
            path: path.to_path_buf(),
            source: e.error,
        })?;

        Ok(())
    }

    fn read_text(&self, path: &Path) -> StorageResult<Option<String>> {
        match std::fs::read_to_string(path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::io(path, e)),
        }
    }

    fn list_dirs(&self, path: &Path) -> StorageResult<Vec<PathBuf>> {
        let entries = match std::fs::read_dir(path) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::io(path, e)),
        };

        let mut dirs = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StorageError::io(path, e))?;
            let is_dir = entry
                .file_type()
                .map_err(|e| StorageError::io(&entry.path(), e))?
                .is_dir();
            if is_dir {
                dirs.push(entry.path());
            }
        }

        dirs.sort();
        Ok(dirs)
    }
}
