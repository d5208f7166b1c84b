//! Shared types for CLI commands: error kinds, exit codes and output helpers.

use crate::acquire::AcquireError;
use crate::config::Config;
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// Process exit codes used by every command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Command completed
    Success = 0,
    /// Command ran but the outcome is a failure (failed sets, incomplete coverage)
    Failure = 1,
    /// Invalid input or configuration
    Validation = 2,
    /// File system or network failure
    Io = 3,
}

impl ExitCode {
    /// Numeric process exit code.
    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }
}

/// Error returned by a CLI command.
#[derive(Debug, Clone)]
pub struct CliError {
    /// Exit code the process should terminate with
    pub exit_code: ExitCode,
    /// Message printed to stderr
    pub message: String,
}

impl CliError {
    /// File system or network failure.
    pub fn io(message: impl Into<String>) -> Self {
        Self {
            exit_code: ExitCode::Io,
            message: message.into(),
        }
    }

    /// Invalid input or configuration.
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            exit_code: ExitCode::Validation,
            message: message.into(),
        }
    }

    /// Generic failure.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            exit_code: ExitCode::Failure,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    /// Acquisition and I/O errors anywhere in the chain map to [`ExitCode::Io`].
    fn from(error: anyhow::Error) -> Self {
        let message = format!("{error:#}");
        let is_io = error
            .chain()
            .any(|cause| cause.is::<AcquireError>() || cause.is::<std::io::Error>());
        if is_io {
            Self::io(message)
        } else {
            Self::failure(message)
        }
    }
}

/// Result type for CLI commands.
pub type CliResult<T> = Result<T, CliError>;

/// Loads configuration for a command.
pub fn load_config(path: Option<&Path>) -> CliResult<Config> {
    Config::load(path).map_err(|e| CliError::validation(format!("Invalid configuration: {e:#}")))
}

/// Prints `value` as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> CliResult<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::io(format!("Failed to serialize JSON: {e}")))?;
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_exit_codes() {
        assert_eq!(ExitCode::Success.code(), 0);
        assert_eq!(ExitCode::Failure.code(), 1);
        assert_eq!(ExitCode::Validation.code(), 2);
        assert_eq!(ExitCode::Io.code(), 3);
    }

    #[test]
    fn test_from_anyhow_maps_acquisition_to_io() {
        let error = anyhow::Error::from(AcquireError::download("https://x.test/a.zip", "timed out"))
            .context("Failed to process set 'twitter'");
        let cli: CliError = error.into();
        assert_eq!(cli.exit_code, ExitCode::Io);
        assert!(cli.message.contains("twitter"));
        assert!(cli.message.contains("timed out"));
    }

    #[test]
    fn test_from_anyhow_maps_io_to_io() {
        let result: anyhow::Result<String> =
            std::fs::read_to_string("/no/such/emoji-canon/file.json").context("Failed to read");
        let cli = CliError::from(result.unwrap_err());
        assert_eq!(cli.exit_code, ExitCode::Io);
    }

    #[test]
    fn test_from_anyhow_generic_failure() {
        let cli = CliError::from(anyhow::anyhow!("Unknown set 'x'"));
        assert_eq!(cli.exit_code, ExitCode::Failure);
        assert_eq!(cli.to_string(), "Unknown set 'x'");
    }
}
