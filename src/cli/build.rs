//! Build command: process sets, expand aliases and synchronize.

use crate::cli::common::{load_config, CliError, CliResult};
use crate::pipeline::{BuildReport, Pipeline};
use clap::Args;
use std::fs;
use std::path::{Path, PathBuf};

/// Build the emoji library from every configured source
#[derive(Debug, Clone, Args)]
pub struct BuildArgs {
    /// Only process this set (repeatable); aliases and sync still cover all sets
    #[arg(long = "set", value_name = "NAME")]
    pub sets: Vec<String>,

    /// Write a JSON build report to this file
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,
}

impl BuildArgs {
    /// Execute the build command
    pub fn execute(&self, config_path: Option<&Path>) -> CliResult<()> {
        let config = load_config(config_path)?;
        let pipeline = Pipeline::load(config)?;

        // Reject unknown names before anything is downloaded
        pipeline
            .select_sets(&self.sets)
            .map_err(|e| CliError::validation(format!("{e:#}")))?;

        let report = pipeline.run(&self.sets)?;
        print_summary(&report);

        if let Some(path) = &self.report {
            let json = serde_json::to_string_pretty(&report)
                .map_err(|e| CliError::io(format!("Failed to serialize report: {e}")))?;
            fs::write(path, json).map_err(|e| {
                CliError::io(format!("Failed to write report {}: {e}", path.display()))
            })?;
            println!("Report written to {}", path.display());
        }

        let failed = report.failed_sets();
        if failed.is_empty() {
            Ok(())
        } else {
            Err(CliError::failure(format!(
                "{} set(s) failed: {}",
                failed.len(),
                failed.join(", ")
            )))
        }
    }
}

fn print_summary(report: &BuildReport) {
    println!("Sets:");
    for set in &report.sets {
        match (&set.report, &set.error) {
            (Some(counts), _) => println!(
                "  ✓ {} ({}): {} written, {} skipped, {} failed",
                set.name, set.kind, counts.written, counts.skipped, counts.failed
            ),
            (None, Some(error)) => println!("  ✗ {} ({}): {error}", set.name, set.kind),
            (None, None) => println!("  ? {} ({})", set.name, set.kind),
        }
    }

    println!("Aliases:");
    for alias in &report.aliases {
        println!(
            "  {}: {} created, {} existing",
            alias.set, alias.report.created, alias.report.existing
        );
    }

    println!("Sync:");
    for sync in &report.sync {
        println!(
            "  {}: {} copied, {} existing",
            sync.set, sync.copied, sync.existing
        );
    }

    let elapsed = report.finished_at - report.started_at;
    println!(
        "Finished in {}.{:03}s",
        elapsed.num_seconds(),
        elapsed.num_milliseconds() % 1000
    );
}
