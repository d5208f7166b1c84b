//! Dependency checking for the rasterization toolchain.
//!
//! This module detects the external programs used to render FluentUI
//! artwork and validates the lookup tables a build needs.
//!
//! # Example
//!
//! ```rust
//! use emoji_canon::config::Config;
//! use emoji_canon::doctor::{DependencyChecker, ToolStatus};
//!
//! let config = Config::new();
//! let checker = DependencyChecker::new();
//!
//! for status in checker.check_all(&config) {
//!     match status.status {
//!         ToolStatus::Available => println!("✓ {}: {}", status.name, status.message),
//!         ToolStatus::Missing => println!("✗ {}: {}", status.name, status.message),
//!         ToolStatus::Unknown => println!("? {}: {}", status.name, status.message),
//!     }
//! }
//! ```
//!
//! # Error Handling
//!
//! - Missing tools return `ToolStatus::Missing`
//! - A missing resize program is only `Unknown` while supersampling is off
//! - Command execution errors return `ToolStatus::Unknown` with error details
//! - All methods are non-panicking and return structured results

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::process::Command;

use crate::config::Config;

/// Display name of the SVG renderer check.
pub const SVG_RENDERER: &str = "SVG Renderer";
/// Display name of the resize program check.
pub const IMAGE_RESIZER: &str = "Image Resizer";
/// Display name of the lookup table check.
pub const LOOKUP_TABLES: &str = "Lookup Tables";

/// Status of a single dependency check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolStatus {
    /// Dependency is present and working
    Available,
    /// Dependency is not found or not working
    Missing,
    /// Could not determine status, or not required by the current config
    Unknown,
}

/// Result of checking a single dependency.
#[derive(Debug, Clone)]
pub struct DependencyStatus {
    /// Name of the dependency (e.g., "SVG Renderer")
    pub name: String,
    /// Status of the dependency
    pub status: ToolStatus,
    /// Version string if detected (e.g., "2.54.4")
    pub version: Option<String>,
    /// Human-readable message about the status
    pub message: String,
}

impl DependencyStatus {
    /// Creates a new dependency status.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        status: ToolStatus,
        version: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            status,
            version,
            message: message.into(),
        }
    }

    /// Creates a status for an available dependency.
    #[must_use]
    pub fn available(name: impl Into<String>, version: impl Into<String>) -> Self {
        let version_str = version.into();
        Self::new(
            name,
            ToolStatus::Available,
            Some(version_str.clone()),
            format!("Found version {version_str}"),
        )
    }

    /// Creates a status for a missing dependency.
    #[must_use]
    pub fn missing(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(name, ToolStatus::Missing, None, message)
    }

    /// Creates a status for an unknown dependency state.
    #[must_use]
    pub fn unknown(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(name, ToolStatus::Unknown, None, message)
    }
}

/// Checker for the external tools and inputs of a build.
#[derive(Debug, Default)]
pub struct DependencyChecker;

impl DependencyChecker {
    /// Creates a new dependency checker.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Checks every dependency named in `config`.
    pub fn check_all(&self, config: &Config) -> Vec<DependencyStatus> {
        vec![
            self.check_renderer(&config.raster.program),
            self.check_resizer(&config.raster.resize_program, config.raster.supersample),
            self.check_tables(&config.paths.emoji_to_name),
        ]
    }

    /// Checks the SVG renderer by running `<program> --version`.
    ///
    /// rsvg-convert prints `rsvg-convert version 2.54.4`.
    pub fn check_renderer(&self, program: &str) -> DependencyStatus {
        match self.run_version_command(program, &["--version"]) {
            Ok(output) => match Self::parse_version(&output) {
                Some(version) => DependencyStatus::available(SVG_RENDERER, version),
                None => DependencyStatus::unknown(
                    SVG_RENDERER,
                    format!("Found but could not parse version: {}", output.trim()),
                ),
            },
            Err(e) if Self::is_command_not_found(&e) => DependencyStatus::missing(
                SVG_RENDERER,
                format!("'{program}' not found in PATH. Required to render FluentUI artwork"),
            ),
            Err(e) => DependencyStatus::unknown(SVG_RENDERER, format!("Error checking: {e:#}")),
        }
    }

    /// Checks the resize program by running `<program> --version`.
    ///
    /// ImageMagick prints `Version: ImageMagick 7.1.1-21 Q16-HDRI ...`. When
    /// supersampling is disabled a missing program is not an error.
    pub fn check_resizer(&self, program: &str, required: bool) -> DependencyStatus {
        match self.run_version_command(program, &["--version"]) {
            Ok(output) => match Self::parse_version(&output) {
                Some(version) => DependencyStatus::available(IMAGE_RESIZER, version),
                None => DependencyStatus::unknown(
                    IMAGE_RESIZER,
                    format!(
                        "Found but could not parse version: {}",
                        output.lines().next().unwrap_or("")
                    ),
                ),
            },
            Err(e) if Self::is_command_not_found(&e) => {
                if required {
                    DependencyStatus::missing(
                        IMAGE_RESIZER,
                        format!("'{program}' not found in PATH. Required when raster.supersample is enabled"),
                    )
                } else {
                    DependencyStatus::unknown(
                        IMAGE_RESIZER,
                        format!("'{program}' not found. Only needed when raster.supersample is enabled"),
                    )
                }
            }
            Err(e) => DependencyStatus::unknown(IMAGE_RESIZER, format!("Error checking: {e:#}")),
        }
    }

    /// Checks that the identity table exists and is a JSON object of strings.
    pub fn check_tables(&self, identity_table: &Path) -> DependencyStatus {
        if !identity_table.exists() {
            return DependencyStatus::missing(
                LOOKUP_TABLES,
                format!("Identity table does not exist: {}", identity_table.display()),
            );
        }

        let parsed = fs::read_to_string(identity_table)
            .map_err(anyhow::Error::from)
            .and_then(|content| {
                serde_json::from_str::<HashMap<String, String>>(&content).map_err(Into::into)
            });

        match parsed {
            Ok(entries) => DependencyStatus::new(
                LOOKUP_TABLES,
                ToolStatus::Available,
                None,
                format!("{} identities in {}", entries.len(), identity_table.display()),
            ),
            Err(e) => DependencyStatus::missing(
                LOOKUP_TABLES,
                format!("Invalid identity table {}: {e}", identity_table.display()),
            ),
        }
    }

    /// Runs a command to get version information.
    ///
    /// Returns stdout, or stderr when stdout is empty.
    fn run_version_command(&self, command: &str, args: &[&str]) -> Result<String> {
        let output = Command::new(command)
            .args(args)
            .output()
            .context(format!("Failed to execute '{command}'"))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        let result = if stdout.trim().is_empty() {
            stderr.to_string()
        } else {
            stdout.to_string()
        };

        Ok(result)
    }

    /// Finds the first `X.Y[.Z]` version on the first line.
    ///
    /// A `-suffix` is dropped:
    /// - "rsvg-convert version 2.54.4" -> Some("2.54.4")
    /// - "Version: ImageMagick 7.1.1-21 Q16-HDRI" -> Some("7.1.1")
    fn parse_version(output: &str) -> Option<String> {
        let first_line = output.lines().next()?;

        first_line
            .split_whitespace()
            .map(|word| word.split('-').next().unwrap_or(word))
            .find(|word| {
                let parts: Vec<&str> = word.split('.').collect();
                parts.len() >= 2
                    && parts
                        .iter()
                        .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()))
            })
            .map(String::from)
    }

    /// Checks if an error indicates a command was not found.
    fn is_command_not_found(error: &anyhow::Error) -> bool {
        let error_msg = format!("{error:#}").to_lowercase();
        error_msg.contains("not found")
            || error_msg.contains("no such file")
            || error_msg.contains("cannot find")
            || error_msg.contains("os error 2") // ENOENT on Unix
    }
}
