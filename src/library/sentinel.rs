//! Per-series origin URL sentinel
//!
//! Each series folder holds one plain-text file with the catalog URL of the
//! series listing. It is written on the first sync and read by every update
//! pass to rediscover the series' issues.

use crate::library::traits::{Storage, StorageResult};
use std::path::Path;

/// Records `url` as the origin of the series in `series_dir`
///
/// Creates the folder if needed and overwrites any previous sentinel, so
/// recording the same origin twice is harmless.
pub fn record_origin(
    storage: &dyn Storage,
    series_dir: &Path,
    sentinel_name: &str,
    url: &str,
) -> StorageResult<()> {
    storage.make_dirs(series_dir)?;
    storage.write_file(&series_dir.join(sentinel_name), url.trim().as_bytes())?;
    tracing::debug!("Recorded origin {} for {}", url, series_dir.display());
    Ok(())
}

/// Reads the origin URL of the series in `series_dir`
///
/// # Returns
///
/// * `Ok(Some(url))` - The recorded origin
/// * `Ok(None)` - No sentinel, or an empty one
/// * `Err(StorageError)` - The sentinel exists but could not be read
pub fn read_origin(
    storage: &dyn Storage,
    series_dir: &Path,
    sentinel_name: &str,
) -> StorageResult<Option<String>> {
    let text = storage.read_text(&series_dir.join(sentinel_name))?;

    Ok(text
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_string))
}
