//! Filling gaps in vendor sets from the reference set.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::fsops::{copy_if_absent, file_name_str, png_files, subdirectories};

/// Outcome of synchronizing one target set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Target set name
    pub set: String,
    /// Files copied from the reference
    pub copied: usize,
    /// Files the target already had
    pub existing: usize,
}

/// Copies every reference asset missing from the other sets.
#[derive(Debug, Clone)]
pub struct CrossSetSynchronizer {
    reference_dir: PathBuf,
}

impl CrossSetSynchronizer {
    /// Creates a synchronizer with `reference_dir` as the source of truth.
    #[must_use]
    pub fn new(reference_dir: impl Into<PathBuf>) -> Self {
        Self {
            reference_dir: reference_dir.into(),
        }
    }

    /// The reference set directory.
    #[must_use]
    pub fn reference_dir(&self) -> &Path {
        &self.reference_dir
    }

    /// Copies every base and tone file of the reference into each target.
    ///
    /// Files already present in a target are left untouched. The reference
    /// directory itself is skipped if it appears among `targets`.
    pub fn sync(&self, targets: &[PathBuf]) -> Result<Vec<SyncReport>> {
        if !self.reference_dir.is_dir() {
            anyhow::bail!(
                "Reference set directory not found: {}",
                self.reference_dir.display()
            );
        }

        let files = self.reference_files()?;
        debug!(files = files.len(), "Collected reference files");

        let mut reports = Vec::new();
        for target in targets {
            if target == &self.reference_dir {
                continue;
            }
            let report = self.sync_one(&files, target)?;
            info!(
                set = %report.set,
                copied = report.copied,
                existing = report.existing,
                "Synchronized set"
            );
            reports.push(report);
        }
        Ok(reports)
    }

    /// Paths of every base and tone file, relative to the reference root.
    fn reference_files(&self) -> Result<Vec<PathBuf>> {
        let root = &self.reference_dir;
        let context = || format!("Failed to list reference set {}", root.display());

        let mut files: Vec<PathBuf> = png_files(root)
            .with_context(context)?
            .into_iter()
            .filter_map(|file| file_name_str(&file).map(PathBuf::from))
            .collect();

        for dir in subdirectories(root).with_context(context)? {
            let Some(name) = file_name_str(&dir) else {
                continue;
            };
            for file in png_files(&dir).with_context(context)? {
                if let Some(file_name) = file_name_str(&file) {
                    files.push(Path::new(name).join(file_name));
                }
            }
        }

        Ok(files)
    }

    fn sync_one(&self, files: &[PathBuf], target: &Path) -> Result<SyncReport> {
        let mut report = SyncReport {
            set: file_name_str(target).unwrap_or_default().to_string(),
            copied: 0,
            existing: 0,
        };

        for relative in files {
            let src = self.reference_dir.join(relative);
            let dst = target.join(relative);
            let copied = copy_if_absent(&src, &dst).with_context(|| {
                format!("Failed to copy {} to {}", src.display(), dst.display())
            })?;
            if copied {
                debug!(set = %report.set, file = %relative.display(), "Copied from reference");
                report.copied += 1;
            } else {
                report.existing += 1;
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_sync_fills_gaps_without_overwriting() {
        let temp = TempDir::new().unwrap();
        let reference = temp.path().join("unicode");
        let target = temp.path().join("twemoji");
        fs::create_dir_all(reference.join("wave")).unwrap();
        fs::create_dir_all(&target).unwrap();
        fs::write(reference.join("wave.png"), b"ref").unwrap();
        fs::write(reference.join("wave/3.png"), b"ref-tone").unwrap();
        fs::write(reference.join("grinning.png"), b"ref").unwrap();
        fs::write(target.join("grinning.png"), b"vendor").unwrap();

        let reports = CrossSetSynchronizer::new(&reference)
            .sync(&[reference.clone(), target.clone()])
            .unwrap();

        assert_eq!(
            reports,
            vec![SyncReport {
                set: "twemoji".to_string(),
                copied: 2,
                existing: 1,
            }]
        );
        assert_eq!(fs::read(target.join("grinning.png")).unwrap(), b"vendor");
        assert_eq!(fs::read(target.join("wave/3.png")).unwrap(), b"ref-tone");
    }

    #[test]
    fn test_missing_reference_is_error() {
        let temp = TempDir::new().unwrap();
        let err = CrossSetSynchronizer::new(temp.path().join("unicode"))
            .sync(&[])
            .unwrap_err();
        assert!(err.to_string().contains("Reference set directory not found"));
    }
}
