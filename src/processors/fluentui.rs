//! Processor for the FluentUI emoji repository layout.
//!
//! Each emoji lives in its own directory:
//!
//! ```text
//! assets/Waving hand/
//!   metadata.json          {"glyph": "👋", ...}
//!   Default/Color/*.svg
//!   Light/Color/*.svg
//!   ...
//!   Dark/Color/*.svg
//! ```
//!
//! Emoji without tones have `Color/*.svg` directly below their directory.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::{Outcome, ProcessReport};
use crate::constants::{
    FLUENTUI_DEFAULT_DIR, FLUENTUI_METADATA_FILE, FLUENTUI_SKIN_TONES, FLUENTUI_STYLE_DIR,
};
use crate::library::fsops::subdirectories;
use crate::models::{Asset, ToneLevel};
use crate::raster::Rasterizer;
use crate::resolver::IdentityResolver;
use crate::tables::Tables;
use crate::workers::map_bounded;

#[derive(Debug, Deserialize)]
struct Metadata {
    glyph: Option<String>,
}

/// One SVG to render into one asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterJob {
    /// Source SVG
    pub svg: PathBuf,
    /// Asset the rendering provides
    pub asset: Asset,
}

/// Renders FluentUI SVG artwork into canonical PNGs.
pub struct FluentuiProcessor<'a> {
    resolver: IdentityResolver<'a>,
    rasterizer: &'a dyn Rasterizer,
    size: u32,
    max_jobs: usize,
}

impl<'a> FluentuiProcessor<'a> {
    /// Creates a processor rendering `size`×`size` PNGs with `rasterizer`,
    /// running at most `max_jobs` renders at once.
    #[must_use]
    pub fn new(
        tables: &'a Tables,
        rasterizer: &'a dyn Rasterizer,
        size: u32,
        max_jobs: usize,
    ) -> Self {
        Self {
            resolver: IdentityResolver::new(tables),
            rasterizer,
            size,
            max_jobs: max_jobs.max(1),
        }
    }

    /// Lists the render jobs for one emoji directory.
    ///
    /// Returns an empty list when the metadata is missing or malformed, the
    /// glyph is unknown, or no artwork is found.
    #[must_use]
    pub fn jobs_for(&self, emoji_dir: &Path) -> Vec<RasterJob> {
        let Some(glyph) = read_glyph(emoji_dir) else {
            return Vec::new();
        };
        let Some(name) = self.resolver.resolve(&glyph, None) else {
            debug!(dir = %emoji_dir.display(), glyph = %glyph.escape_unicode(), "Unknown glyph");
            return Vec::new();
        };

        if !supports_tones(emoji_dir) {
            return first_svg(&emoji_dir.join(FLUENTUI_STYLE_DIR))
                .map(|svg| RasterJob {
                    svg,
                    asset: Asset::base(name),
                })
                .into_iter()
                .collect();
        }

        let default = first_svg(&emoji_dir.join(FLUENTUI_DEFAULT_DIR).join(FLUENTUI_STYLE_DIR))
            .map(|svg| RasterJob {
                svg,
                asset: Asset::base(name),
            });

        let toned = FLUENTUI_SKIN_TONES.iter().filter_map(|(dir, level)| {
            let level = ToneLevel::new(*level)?;
            let svg = first_svg(&emoji_dir.join(dir).join(FLUENTUI_STYLE_DIR))?;
            Some(RasterJob {
                svg,
                asset: Asset::toned(name, level),
            })
        });

        default.into_iter().chain(toned).collect()
    }

    /// Renders every emoji directory under `asset_dir` into `output_dir`.
    pub fn process(&self, asset_dir: &Path, output_dir: &Path) -> Result<ProcessReport> {
        if !asset_dir.is_dir() {
            anyhow::bail!("Asset directory not found: {}", asset_dir.display());
        }

        let emoji_dirs = subdirectories(asset_dir)
            .with_context(|| format!("Failed to list assets in {}", asset_dir.display()))?;

        let mut report = ProcessReport::default();
        let mut jobs = Vec::new();
        for dir in &emoji_dirs {
            let found = self.jobs_for(dir);
            if found.is_empty() {
                report.record(Outcome::Skipped);
            }
            jobs.extend(found);
        }

        debug!(jobs = jobs.len(), max_jobs = self.max_jobs, "Rasterizing FluentUI artwork");

        let outcomes = map_bounded(jobs, self.max_jobs, |job| {
            let png = job.asset.path_in(output_dir);
            match self.rasterizer.rasterize(&job.svg, &png, self.size) {
                Ok(()) => Outcome::Written,
                Err(e) => {
                    warn!(asset = %job.asset, svg = %job.svg.display(), "Rasterization failed: {e}");
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
            "Processed FluentUI set"
        );
        Ok(report)
    }
}

/// Tones are available only when `Default` and all five tone directories exist.
fn supports_tones(emoji_dir: &Path) -> bool {
    emoji_dir.join(FLUENTUI_DEFAULT_DIR).is_dir()
        && FLUENTUI_SKIN_TONES
            .iter()
            .all(|(dir, _)| emoji_dir.join(dir).is_dir())
}

fn read_glyph(emoji_dir: &Path) -> Option<String> {
    let path = emoji_dir.join(FLUENTUI_METADATA_FILE);
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) => {
            debug!(path = %path.display(), "No readable metadata: {e}");
            return None;
        }
    };
    match serde_json::from_str::<Metadata>(&content) {
        Ok(metadata) => metadata.glyph.filter(|glyph| !glyph.is_empty()),
        Err(e) => {
            debug!(path = %path.display(), "Malformed metadata: {e}");
            None
        }
    }
}

fn first_svg(dir: &Path) -> Option<PathBuf> {
    let mut svgs: Vec<PathBuf> = fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "svg"))
        .collect();
    svgs.sort();
    svgs.into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::RasterError;
    use crate::tables::FitzpatrickScale;
    use std::collections::{HashMap, HashSet};
    use tempfile::TempDir;

    /// Copies the SVG bytes to the PNG path; fails for files named `broken.svg`.
    struct CopyRasterizer;

    impl Rasterizer for CopyRasterizer {
        fn rasterize(&self, svg: &Path, png: &Path, _size: u32) -> Result<(), RasterError> {
            if svg.ends_with("broken.svg") {
                return Err(RasterError::Output {
                    path: png.to_path_buf(),
                    error: std::io::Error::other("broken"),
                });
            }
            fs::create_dir_all(png.parent().unwrap()).unwrap();
            fs::copy(svg, png).unwrap();
            Ok(())
        }
    }

    fn tables() -> Tables {
        Tables::new(
            HashMap::from([
                ("\u{1F44B}\u{FE0F}".to_string(), "wave".to_string()),
                ("\u{1F600}".to_string(), "grinning".to_string()),
                ("\u{1F914}".to_string(), "thinking".to_string()),
            ]),
            HashSet::from(["wave".to_string()]),
            HashMap::new(),
            FitzpatrickScale::standard(),
        )
    }

    fn emoji_dir(root: &Path, name: &str, metadata: &str, svgs: &[(&str, &str)]) {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(FLUENTUI_METADATA_FILE), metadata).unwrap();
        for (relative, content) in svgs {
            let path = dir.join(relative);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
    }

    #[test]
    fn test_process_toned_and_plain() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();

        let mut toned = vec![("Default/Color/wave_color_default.svg", "default")];
        let tone_files: Vec<String> = FLUENTUI_SKIN_TONES
            .iter()
            .map(|(dir, _)| format!("{dir}/Color/wave_color.svg"))
            .collect();
        for file in &tone_files {
            toned.push((file.as_str(), "tone"));
        }
        emoji_dir(input.path(), "Waving hand", r#"{"glyph": "👋"}"#, &toned);
        emoji_dir(
            input.path(),
            "Grinning face",
            r#"{"glyph": "😀", "tts": "grinning face"}"#,
            &[("Color/b.svg", "second"), ("Color/a.svg", "first")],
        );
        emoji_dir(input.path(), "Broken", "{not json", &[("Color/x.svg", "x")]);
        emoji_dir(input.path(), "Unknown", r#"{"glyph": "🦀"}"#, &[("Color/x.svg", "x")]);
        emoji_dir(
            input.path(),
            "Thinking face",
            r#"{"glyph": "🤔"}"#,
            &[("Color/broken.svg", "x")],
        );

        let tables = tables();
        let rasterizer = CopyRasterizer;
        let report = FluentuiProcessor::new(&tables, &rasterizer, 72, 3)
            .process(input.path(), output.path())
            .unwrap();

        assert_eq!(report.written, 7);
        assert_eq!(report.skipped, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(fs::read_to_string(output.path().join("wave.png")).unwrap(), "default");
        for level in 1..=5 {
            assert!(output.path().join(format!("wave/{level}.png")).exists());
        }
        assert_eq!(fs::read_to_string(output.path().join("grinning.png")).unwrap(), "first");
        assert!(!output.path().join("thinking.png").exists());
    }

    #[test]
    fn test_partial_tone_directories_use_plain_artwork() {
        let input = TempDir::new().unwrap();
        emoji_dir(
            input.path(),
            "Waving hand",
            r#"{"glyph": "👋"}"#,
            &[
                ("Default/Color/d.svg", "default"),
                ("Light/Color/l.svg", "light"),
                ("Color/plain.svg", "plain"),
            ],
        );

        let tables = tables();
        let rasterizer = CopyRasterizer;
        let processor = FluentuiProcessor::new(&tables, &rasterizer, 72, 1);
        let jobs = processor.jobs_for(&input.path().join("Waving hand"));

        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].asset, Asset::base("wave"));
        assert!(jobs[0].svg.ends_with("Color/plain.svg"));
    }
}
