//! Doctor command for dependency checking.

use crate::cli::common::{CliError, CliResult};
use crate::config::Config;
use crate::doctor::{DependencyChecker, DoctorFormatter, OutputFormat, ToolStatus};
use clap::Args;
use std::path::Path;
use tracing::warn;

/// Check that the rasterizer programs and lookup tables are available
#[derive(Debug, Clone, Args)]
pub struct DoctorArgs {
    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

impl DoctorArgs {
    /// Execute the doctor command
    pub fn execute(&self, config_path: Option<&Path>) -> CliResult<()> {
        // A broken config should not stop the environment report
        let config = Config::load(config_path).unwrap_or_else(|e| {
            warn!("Using default configuration: {e:#}");
            Config::default()
        });

        let statuses = DependencyChecker::new().check_all(&config);

        let format = if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Terminal
        };
        let formatter = DoctorFormatter::with_format(format);
        println!("{}", formatter.format_results(&statuses));

        let has_missing = statuses.iter().any(|s| s.status == ToolStatus::Missing);
        if has_missing {
            Err(CliError::validation("Some dependencies are missing"))
        } else {
            Ok(())
        }
    }
}
