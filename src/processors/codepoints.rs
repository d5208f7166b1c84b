//! Processor for sets whose files are named by hex codepoints.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::{Outcome, ProcessReport};
use crate::codepoints::{CodepointDecoder, DecodeOptions};
use crate::config::default_jobs;
use crate::library::fsops::{copy_replacing, file_name_str, png_files};
use crate::models::Asset;
use crate::resolver::IdentityResolver;
use crate::tables::Tables;

/// Copies codepoint-named PNGs (Twemoji, Noto) to canonical paths.
#[derive(Debug, Clone)]
pub struct CodepointsProcessor<'a> {
    decoder: CodepointDecoder<'a>,
    resolver: IdentityResolver<'a>,
    max_workers: usize,
}

impl<'a> CodepointsProcessor<'a> {
    /// Creates a processor for one vendor naming convention.
    #[must_use]
    pub fn new(tables: &'a Tables, options: DecodeOptions) -> Self {
        Self {
            decoder: CodepointDecoder::new(tables.fitzpatrick(), options),
            resolver: IdentityResolver::new(tables),
            max_workers: default_jobs(),
        }
    }

    /// Limits the number of concurrent copy workers.
    #[must_use]
    pub fn with_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    /// Maps one vendor file name to the asset it provides, if any.
    #[must_use]
    pub fn asset_for(&self, file_name: &str) -> Option<Asset> {
        let decoded = match self.decoder.decode(file_name) {
            Ok(decoded) => decoded,
            Err(e) => {
                debug!(file_name, "Skipping undecodable file: {e}");
                return None;
            }
        };

        let name = self.resolver.resolve(&decoded.identity, decoded.tone)?;
        Some(Asset::new(name, decoded.tone))
    }

    /// Processes every `*.png` in `asset_dir` into `output_dir`.
    ///
    /// Files are visited in sorted order; when several files map to the same
    /// asset, the first one is used.
    pub fn process(&self, asset_dir: &Path, output_dir: &Path) -> Result<ProcessReport> {
        if !asset_dir.is_dir() {
            anyhow::bail!("Asset directory not found: {}", asset_dir.display());
        }

        let files = png_files(asset_dir)
            .with_context(|| format!("Failed to list assets in {}", asset_dir.display()))?;

        let mut report = ProcessReport::default();
        let mut planned = HashSet::new();
        let mut jobs: Vec<(PathBuf, PathBuf)> = Vec::new();

        for file in files {
            let Some(asset) = file_name_str(&file).and_then(|name| self.asset_for(name)) else {
                report.record(Outcome::Skipped);
                continue;
            };
            if !planned.insert(asset.clone()) {
                debug!(%asset, file = %file.display(), "Duplicate source for asset");
                report.record(Outcome::Skipped);
                continue;
            }
            let target = asset.path_in(output_dir);
            jobs.push((file, target));
        }

        let outcomes = crate::workers::map_bounded(jobs, self.max_workers, |(src, dst)| {
            match copy_replacing(&src, &dst) {
                Ok(()) => Outcome::Written,
                Err(e) => {
                    warn!(src = %src.display(), dst = %dst.display(), "Failed to copy asset: {e}");
                    Outcome::Failed
                }
            }
        });
        report += outcomes.into_iter().collect::<ProcessReport>();

        info!(
            output = %output_dir.display(),
            written = report.written,
            skipped = report.skipped,
            failed = report.failed,
            "Processed codepoint set"
        );
        Ok(report)
    }
}
