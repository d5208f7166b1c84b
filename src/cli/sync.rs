//! Sync command.

use crate::cli::common::{load_config, CliResult};
use crate::constants::REFERENCE_SET;
use crate::pipeline::Pipeline;
use crate::tables::Tables;
use clap::Args;
use std::path::Path;

/// Fill gaps in every set from the reference set
#[derive(Debug, Clone, Args)]
pub struct SyncArgs {}

impl SyncArgs {
    /// Execute the sync command
    pub fn execute(&self, config_path: Option<&Path>) -> CliResult<()> {
        // Synchronization only touches files, no lookup tables needed
        let pipeline = Pipeline::new(load_config(config_path)?, Tables::default());

        let reports = pipeline.synchronize()?;
        println!("Synchronized from '{REFERENCE_SET}':");
        for report in &reports {
            println!(
                "  {}: {} copied, {} existing",
                report.set, report.copied, report.existing
            );
        }
        Ok(())
    }
}
