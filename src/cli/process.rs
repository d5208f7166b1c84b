//! Process command: acquire and process a single set.

use crate::cli::common::{load_config, CliError, CliResult};
use crate::pipeline::Pipeline;
use clap::Args;
use std::path::Path;

/// Acquire and process one set without alias expansion or sync
#[derive(Debug, Clone, Args)]
pub struct ProcessArgs {
    /// Name of the set to process
    #[arg(value_name = "SET")]
    pub set: String,
}

impl ProcessArgs {
    /// Execute the process command
    pub fn execute(&self, config_path: Option<&Path>) -> CliResult<()> {
        let config = load_config(config_path)?;
        if config.set(&self.set).is_none() {
            return Err(CliError::validation(format!("Unknown set '{}'", self.set)));
        }

        let pipeline = Pipeline::load(config)?;
        let set = pipeline
            .config()
            .set(&self.set)
            .ok_or_else(|| CliError::validation(format!("Unknown set '{}'", self.set)))?;

        let report = pipeline.process_set(set)?;
        println!(
            "{} ({}): {} written, {} skipped, {} failed",
            set.name, set.kind, report.written, report.skipped, report.failed
        );
        println!("Output: {}", pipeline.config().set_dir(&set.name).display());
        Ok(())
    }
}
