//! Coverage command: compare every set against the reference.

use crate::cli::common::{load_config, print_json, CliError, CliResult};
use crate::library::CoverageReport;
use crate::pipeline::Pipeline;
use crate::tables::Tables;
use clap::Args;
use std::path::Path;

const MAX_LISTED: usize = 20;

/// Report reference assets missing from each set
#[derive(Debug, Clone, Args)]
pub struct CoverageArgs {
    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

impl CoverageArgs {
    /// Execute the coverage command
    ///
    /// Exits with [`ExitCode::Failure`](crate::cli::ExitCode::Failure) when
    /// any set is incomplete.
    pub fn execute(&self, config_path: Option<&Path>) -> CliResult<()> {
        let pipeline = Pipeline::new(load_config(config_path)?, Tables::default());
        let reports = pipeline.coverage()?;

        if self.json {
            print_json(&reports)?;
        } else {
            for report in &reports {
                print_report(report);
            }
        }

        let incomplete: Vec<&str> = reports
            .iter()
            .filter(|report| !report.is_complete())
            .map(|report| report.set.as_str())
            .collect();

        if incomplete.is_empty() {
            Ok(())
        } else {
            Err(CliError::failure(format!(
                "Incomplete sets: {}",
                incomplete.join(", ")
            )))
        }
    }
}

fn print_report(report: &CoverageReport) {
    let symbol = if report.is_complete() { "✓" } else { "✗" };
    println!(
        "{symbol} {}: {} present, {} missing",
        report.set,
        report.present,
        report.missing.len()
    );
    for asset in report.missing.iter().take(MAX_LISTED) {
        println!("    {asset}");
    }
    if report.missing.len() > MAX_LISTED {
        println!("    ... and {} more", report.missing.len() - MAX_LISTED);
    }
}
