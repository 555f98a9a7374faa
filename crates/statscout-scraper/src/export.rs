//! Export destinations.

use crate::error::Result;
use statscout_core::{PageId, Timestamp};
use std::path::{Path, PathBuf};

/// `<dir>/<page-id>_<timestamp>.csv`, the timestamp rendered with `format`.
///
/// # Errors
/// Returns error if `format` is not a valid `strftime` pattern.
pub fn default_export_path(
    dir: &Path,
    page_id: &PageId,
    at: &Timestamp,
    format: &str,
) -> Result<PathBuf> {
    Ok(dir.join(format!("{}_{}.csv", page_id.as_str(), at.format(format)?)))
}

/// Move a file to `destination`, creating its parent directories.
///
/// Falls back to copy-and-delete when a rename crosses filesystems.
pub fn move_file(source: &Path, destination: &Path) -> Result<()> {
    if let Some(parent) = destination.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if std::fs::rename(source, destination).is_err() {
        std::fs::copy(source, destination)?;
        std::fs::remove_file(source)?;
    }

    tracing::debug!(
        from = %source.display(),
        to = %destination.display(),
        "moved export"
    );
    Ok(())
}
