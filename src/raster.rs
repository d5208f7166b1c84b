//! SVG to PNG rasterization through an external program.
//!
//! The renderer itself is not part of this crate. [`Rasterizer`] is the
//! boundary; [`CommandRasterizer`] drives `rsvg-convert` (and, in
//! supersample mode, ImageMagick) as subprocesses.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use thiserror::Error;
use tracing::debug;

use crate::config::RasterConfig;
use crate::constants::SUPERSAMPLE_FACTOR;

/// Failure to rasterize one asset.
#[derive(Debug, Error)]
pub enum RasterError {
    /// The program could not be started.
    #[error("Failed to run '{program}': {error}")]
    Spawn {
        /// Program name
        program: String,
        /// Spawn error
        #[source]
        error: io::Error,
    },
    /// The program ran but exited unsuccessfully.
    #[error("'{program}' exited with {status}")]
    Failed {
        /// Program name
        program: String,
        /// Exit status
        status: ExitStatus,
    },
    /// The output directory could not be prepared.
    #[error("Failed to prepare output {}: {error}", path.display())]
    Output {
        /// Output path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        error: io::Error,
    },
}

/// Renders an SVG file into a square PNG.
pub trait Rasterizer: Send + Sync {
    /// Writes `svg` rendered at `size`×`size` pixels to `png`.
    fn rasterize(&self, svg: &Path, png: &Path, size: u32) -> Result<(), RasterError>;
}

/// Rasterizer backed by external commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRasterizer {
    program: String,
    resize_program: String,
    supersample: bool,
}

impl CommandRasterizer {
    /// Creates a rasterizer running `program` directly at the target size.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            resize_program: "magick".to_string(),
            supersample: false,
        }
    }

    /// Creates a rasterizer from the `[raster]` config section.
    #[must_use]
    pub fn from_config(raster: &RasterConfig) -> Self {
        Self {
            program: raster.program.clone(),
            resize_program: raster.resize_program.clone(),
            supersample: raster.supersample,
        }
    }

    /// Enables two-step rendering: large render, then downscale.
    #[must_use]
    pub fn with_supersample(mut self, resize_program: impl Into<String>) -> Self {
        self.resize_program = resize_program.into();
        self.supersample = true;
        self
    }

    /// Arguments for a direct render at the target size.
    #[must_use]
    pub fn direct_args(svg: &Path, png: &Path, size: u32) -> Vec<OsString> {
        let size = size.to_string();
        vec![
            "-w".into(),
            size.clone().into(),
            "-h".into(),
            size.into(),
            "--keep-aspect-ratio".into(),
            "--dpi-x".into(),
            "300".into(),
            "--dpi-y".into(),
            "300".into(),
            "-o".into(),
            png.into(),
            svg.into(),
        ]
    }

    /// Arguments for the large transparent render of supersample mode.
    #[must_use]
    pub fn supersample_args(svg: &Path, intermediate: &Path, size: u32) -> Vec<OsString> {
        let large = size.saturating_mul(SUPERSAMPLE_FACTOR);
        vec![
            "--background-color=none".into(),
            format!("--width={large}").into(),
            format!("--height={large}").into(),
            "--output".into(),
            intermediate.into(),
            svg.into(),
        ]
    }

    /// Arguments for the downscale step of supersample mode.
    #[must_use]
    pub fn resize_args(intermediate: &Path, png: &Path, size: u32) -> Vec<OsString> {
        vec![
            intermediate.into(),
            "-resize".into(),
            format!("{size}x{size}").into(),
            png.into(),
        ]
    }

    /// Path of the intermediate large render for `png`.
    #[must_use]
    pub fn intermediate_path(png: &Path) -> PathBuf {
        let mut name = png.as_os_str().to_owned();
        name.push(".tmp.png");
        PathBuf::from(name)
    }

    fn run(program: &str, args: &[OsString]) -> Result<(), RasterError> {
        let status = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|error| RasterError::Spawn {
                program: program.to_string(),
                error,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(RasterError::Failed {
                program: program.to_string(),
                status,
            })
        }
    }
}

impl Default for CommandRasterizer {
    fn default() -> Self {
        Self::from_config(&RasterConfig::default())
    }
}

impl Rasterizer for CommandRasterizer {
    fn rasterize(&self, svg: &Path, png: &Path, size: u32) -> Result<(), RasterError> {
        if let Some(parent) = png.parent() {
            fs::create_dir_all(parent).map_err(|error| RasterError::Output {
                path: png.to_path_buf(),
                error,
            })?;
        }

        if !self.supersample {
            debug!(svg = %svg.display(), png = %png.display(), "Rasterizing");
            return Self::run(&self.program, &Self::direct_args(svg, png, size));
        }

        let intermediate = Self::intermediate_path(png);
        debug!(svg = %svg.display(), png = %png.display(), "Rasterizing with supersampling");
        let result = Self::run(
            &self.program,
            &Self::supersample_args(svg, &intermediate, size),
        )
        .and_then(|()| {
            Self::run(
                &self.resize_program,
                &Self::resize_args(&intermediate, png, size),
            )
        });

        if intermediate.exists() {
            if let Err(e) = fs::remove_file(&intermediate) {
                debug!(path = %intermediate.display(), "Failed to remove intermediate render: {e}");
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[OsString]) -> Vec<String> {
        args.iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_direct_args() {
        let args = CommandRasterizer::direct_args(Path::new("in.svg"), Path::new("out.png"), 72);
        assert_eq!(
            strings(&args),
            [
                "-w",
                "72",
                "-h",
                "72",
                "--keep-aspect-ratio",
                "--dpi-x",
                "300",
                "--dpi-y",
                "300",
                "-o",
                "out.png",
                "in.svg"
            ]
        );
    }

    #[test]
    fn test_supersample_args() {
        let intermediate = CommandRasterizer::intermediate_path(Path::new("out/x.png"));
        assert_eq!(intermediate, PathBuf::from("out/x.png.tmp.png"));

        let render =
            CommandRasterizer::supersample_args(Path::new("in.svg"), &intermediate, 72);
        assert_eq!(
            strings(&render),
            [
                "--background-color=none",
                "--width=288",
                "--height=288",
                "--output",
                "out/x.png.tmp.png",
                "in.svg"
            ]
        );

        let resize = CommandRasterizer::resize_args(&intermediate, Path::new("out/x.png"), 72);
        assert_eq!(
            strings(&resize),
            ["out/x.png.tmp.png", "-resize", "72x72", "out/x.png"]
        );
    }

    #[test]
    fn test_from_config() {
        let mut raster = RasterConfig::default();
        assert_eq!(
            CommandRasterizer::from_config(&raster),
            CommandRasterizer::new("rsvg-convert")
        );

        raster.supersample = true;
        raster.resize_program = "convert".to_string();
        assert_eq!(
            CommandRasterizer::from_config(&raster),
            CommandRasterizer::new("rsvg-convert").with_supersample("convert")
        );
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let rasterizer = CommandRasterizer::new("emoji-canon-no-such-rasterizer");
        let err = rasterizer
            .rasterize(
                &temp.path().join("in.svg"),
                &temp.path().join("out.png"),
                72,
            )
            .unwrap_err();
        assert!(matches!(err, RasterError::Spawn { .. }));
    }
}
