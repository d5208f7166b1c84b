//! Aliases command.

use crate::cli::common::{load_config, CliError, CliResult};
use crate::pipeline::Pipeline;
use clap::Args;
use std::path::Path;

/// Copy assets to their alias names
#[derive(Debug, Clone, Args)]
pub struct AliasesArgs {
    /// Only expand this set (repeatable)
    #[arg(long = "set", value_name = "NAME")]
    pub sets: Vec<String>,
}

impl AliasesArgs {
    /// Execute the aliases command
    pub fn execute(&self, config_path: Option<&Path>) -> CliResult<()> {
        let pipeline = Pipeline::load(load_config(config_path)?)?;
        pipeline
            .select_sets(&self.sets)
            .map_err(|e| CliError::validation(format!("{e:#}")))?;

        for outcome in pipeline.expand_aliases(&self.sets)? {
            println!(
                "{}: {} created, {} existing",
                outcome.set, outcome.report.created, outcome.report.existing
            );
        }
        Ok(())
    }
}
