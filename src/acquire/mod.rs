//! Acquisition of vendor zip archives.
//!
//! A source is either an `http(s)` URL or a local file path. The archive is
//! written to a temporary file, extracted into a temporary directory and the
//! caller's closure runs against that directory. Both temporaries live in
//! scoped guards, so they are removed when the closure returns, fails or
//! panics.
//!
//! # Example
//!
//! ```no_run
//! use emoji_canon::acquire::Acquirer;
//! use std::time::Duration;
//!
//! let acquirer = Acquirer::new(Duration::from_secs(60), 10);
//! let count = acquirer.with_extracted("vendor/twemoji.zip", |root| {
//!     Ok(std::fs::read_dir(root)?.count())
//! })?;
//! # Ok::<(), anyhow::Error>(())
//! ```

mod download;
mod extract;

pub use extract::extract_archive;

use anyhow::Result;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::{NamedTempFile, TempDir};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::NetworkConfig;

/// Errors that make a whole source unusable.
#[derive(Debug, Error)]
pub enum AcquireError {
    /// The archive could not be fetched or copied.
    #[error("Failed to acquire {location}: {reason}")]
    Download {
        /// URL or path that was requested
        location: String,
        /// Status line or transport error
        reason: String,
        /// HTTP status of the terminal response, if any
        status: Option<u16>,
    },
    /// The archive could not be read as a zip file.
    #[error("Failed to extract {}: {reason}", archive.display())]
    Extraction {
        /// Temporary archive path
        archive: PathBuf,
        /// Underlying zip or I/O error
        reason: String,
    },
}

impl AcquireError {
    pub(crate) fn download(location: impl Into<String>, reason: impl ToString) -> Self {
        Self::Download {
            location: location.into(),
            reason: reason.to_string(),
            status: None,
        }
    }

    pub(crate) fn extraction(archive: &Path, reason: impl ToString) -> Self {
        Self::Extraction {
            archive: archive.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}

/// Returns true if `source` names a remote archive.
#[must_use]
pub fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Fetches and extracts archives into scoped temporary storage.
#[derive(Debug, Clone)]
pub struct Acquirer {
    timeout: Duration,
    max_redirects: usize,
    scratch_dir: Option<PathBuf>,
}

impl Acquirer {
    /// Creates an acquirer with the given request timeout and redirect limit.
    #[must_use]
    pub fn new(timeout: Duration, max_redirects: usize) -> Self {
        Self {
            timeout,
            max_redirects,
            scratch_dir: None,
        }
    }

    /// Creates an acquirer from the `[network]` config section.
    #[must_use]
    pub fn from_config(network: &NetworkConfig) -> Self {
        Self::new(
            Duration::from_secs(network.timeout_secs),
            network.max_redirects,
        )
    }

    /// Places temporary files under `dir` instead of the system temp dir.
    #[must_use]
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    /// Acquires `source`, extracts it and runs `body` on the extraction root.
    ///
    /// Acquisition failures are returned as [`AcquireError`] wrapped in
    /// `anyhow::Error`; errors from `body` are passed through unchanged.
    pub fn with_extracted<T, F>(&self, source: &str, body: F) -> Result<T>
    where
        F: FnOnce(&Path) -> Result<T>,
    {
        let mut archive = self.temp_archive(source)?;
        let extracted = self.temp_dir(source)?;

        self.fetch(source, archive.as_file_mut())?;
        let entries = extract_archive(archive.path(), extracted.path())?;
        info!(source, entries, "Extracted archive");

        let result = body(extracted.path());

        if let Err(e) = archive.close() {
            warn!(source, "Failed to remove temporary archive: {e}");
        }
        if let Err(e) = extracted.close() {
            warn!(source, "Failed to remove extraction directory: {e}");
        }

        result
    }

    fn temp_archive(&self, source: &str) -> Result<NamedTempFile, AcquireError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("emoji-").suffix(".zip");
        match &self.scratch_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(|e| AcquireError::download(source, format!("cannot create temp file: {e}")))
    }

    fn temp_dir(&self, source: &str) -> Result<TempDir, AcquireError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("emoji-");
        match &self.scratch_dir {
            Some(dir) => builder.tempdir_in(dir),
            None => builder.tempdir(),
        }
        .map_err(|e| AcquireError::download(source, format!("cannot create temp dir: {e}")))
    }

    /// Writes the archive bytes of `source` into `file`.
    fn fetch(&self, source: &str, file: &mut File) -> Result<u64, AcquireError> {
        if is_remote(source) {
            download::fetch_remote(source, file, self.timeout, self.max_redirects)
        } else {
            debug!(source, "Copying local archive");
            let mut input = File::open(source).map_err(|e| AcquireError::download(source, e))?;
            io::copy(&mut input, file).map_err(|e| AcquireError::download(source, e))
        }
    }
}

impl Default for Acquirer {
    fn default() -> Self {
        Self::from_config(&NetworkConfig::default())
    }
}
