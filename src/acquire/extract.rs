//! Zip extraction with path traversal protection.

use std::fs::{self, File};
use std::io;
use std::path::Path;
use tracing::{debug, warn};
use zip::ZipArchive;

use super::AcquireError;

/// Extracts every entry of `archive` below `dest`.
///
/// - entries whose names would escape `dest` are skipped with a warning
/// - an entry whose target file already exists is skipped
/// - parent directories are created as needed
///
/// Returns the number of files written.
pub fn extract_archive(archive: &Path, dest: &Path) -> Result<usize, AcquireError> {
    let file = File::open(archive).map_err(|e| AcquireError::extraction(archive, e))?;
    let mut zip = ZipArchive::new(file).map_err(|e| AcquireError::extraction(archive, e))?;

    let mut written = 0;
    for index in 0..zip.len() {
        let mut entry = zip
            .by_index(index)
            .map_err(|e| AcquireError::extraction(archive, e))?;

        let Some(relative) = entry.enclosed_name() else {
            warn!(entry = entry.name(), "Skipping archive entry outside extraction root");
            continue;
        };
        let target = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&target).map_err(|e| AcquireError::extraction(archive, e))?;
            continue;
        }

        if target.exists() {
            debug!(target = %target.display(), "Skipping existing file");
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| AcquireError::extraction(archive, e))?;
        }

        let mut out = File::create(&target).map_err(|e| AcquireError::extraction(archive, e))?;
        io::copy(&mut entry, &mut out).map_err(|e| AcquireError::extraction(archive, e))?;
        written += 1;
    }

    Ok(written)
}
