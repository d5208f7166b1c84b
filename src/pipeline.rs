//! End-to-end build of the output tree.
//!
//! Sets are handled one at a time: a source is acquired, processed and its
//! scratch files removed before the next one starts. After all sets are
//! processed, aliases are expanded in every set and the reference set is
//! synchronized into the others.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{error, info, warn};

use crate::acquire::Acquirer;
use crate::codepoints::DecodeOptions;
use crate::config::{Config, SetConfig, SetKind};
use crate::constants::REFERENCE_SET;
use crate::library::{
    AliasExpander, CoverageReport, CrossSetSynchronizer, ExpandReport, SetInventory, SyncReport,
};
use crate::processors::{
    CodepointsProcessor, FluentuiProcessor, ProcessReport, UnicodeHtmlProcessor,
};
use crate::raster::{CommandRasterizer, Rasterizer};
use crate::tables::Tables;

/// Result of processing one set during a build.
#[derive(Debug, Clone, Serialize)]
pub struct SetOutcome {
    /// Set name
    pub name: String,
    /// Set kind
    pub kind: SetKind,
    /// Counts, when processing succeeded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<ProcessReport>,
    /// Error chain, when processing failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Alias expansion result for one set.
#[derive(Debug, Clone, Serialize)]
pub struct AliasOutcome {
    /// Set name
    pub set: String,
    /// Counts
    #[serde(flatten)]
    pub report: ExpandReport,
}

/// Summary of a full build.
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    /// When the build started
    pub started_at: DateTime<Utc>,
    /// When the build finished
    pub finished_at: DateTime<Utc>,
    /// Per-set processing results, in config order
    pub sets: Vec<SetOutcome>,
    /// Alias expansion results
    pub aliases: Vec<AliasOutcome>,
    /// Synchronization results
    pub sync: Vec<SyncReport>,
}

impl BuildReport {
    /// Names of the sets that failed to process.
    #[must_use]
    pub fn failed_sets(&self) -> Vec<&str> {
        self.sets
            .iter()
            .filter(|set| set.error.is_some())
            .map(|set| set.name.as_str())
            .collect()
    }
}

/// Decoding conventions configured for a codepoint set.
pub fn decode_options(set: &SetConfig) -> Result<DecodeOptions> {
    let mut chars = set.separator.chars();
    let separator = match (chars.next(), chars.next()) {
        (Some(c), None) => c,
        _ => anyhow::bail!(
            "Set '{}' separator must be a single character, got '{}'",
            set.name,
            set.separator
        ),
    };
    Ok(DecodeOptions {
        separator,
        strip_prefix: set.strip_prefix.clone(),
        implicit_selector: set.implicit_selector,
    })
}

/// Drives acquisition, processing, alias expansion and synchronization.
pub struct Pipeline {
    config: Config,
    tables: Tables,
    acquirer: Acquirer,
    rasterizer: Box<dyn Rasterizer>,
}

impl Pipeline {
    /// Creates a pipeline using the configured network and rasterizer settings.
    #[must_use]
    pub fn new(config: Config, tables: Tables) -> Self {
        let acquirer = Acquirer::from_config(&config.network);
        let rasterizer: Box<dyn Rasterizer> =
            Box::new(CommandRasterizer::from_config(&config.raster));
        Self {
            config,
            tables,
            acquirer,
            rasterizer,
        }
    }

    /// Loads the lookup tables named in `config` and creates a pipeline.
    pub fn load(config: Config) -> Result<Self> {
        let tables = Tables::load(&config.paths)?;
        Ok(Self::new(config, tables))
    }

    /// Replaces the SVG rasterizer.
    #[must_use]
    pub fn with_rasterizer(mut self, rasterizer: Box<dyn Rasterizer>) -> Self {
        self.rasterizer = rasterizer;
        self
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The lookup tables.
    #[must_use]
    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    /// Configured sets restricted to `only`; all sets when `only` is empty.
    pub fn select_sets(&self, only: &[String]) -> Result<Vec<&SetConfig>> {
        if only.is_empty() {
            return Ok(self.config.sets.iter().collect());
        }
        only.iter()
            .map(|name| {
                self.config
                    .set(name)
                    .with_context(|| format!("Unknown set '{name}'"))
            })
            .collect()
    }

    /// Acquires and processes one set into its output directory.
    pub fn process_set(&self, set: &SetConfig) -> Result<ProcessReport> {
        let output_dir = self.config.set_dir(&set.name);
        info!(set = %set.name, kind = %set.kind, "Processing set");

        match set.kind {
            SetKind::UnicodeHtml => {
                let emoji_list = set
                    .emoji_list
                    .as_deref()
                    .with_context(|| format!("Set '{}' has no emoji_list", set.name))?;
                let modifiers = set
                    .modifier_sequences
                    .as_deref()
                    .with_context(|| format!("Set '{}' has no modifier_sequences", set.name))?;
                UnicodeHtmlProcessor::new(&self.tables).process_files(
                    &self.config.vendor_path(emoji_list),
                    &self.config.vendor_path(modifiers),
                    &output_dir,
                )
            }
            SetKind::Codepoints => {
                let options = decode_options(set)?;
                let processor = CodepointsProcessor::new(&self.tables, options)
                    .with_workers(self.config.raster.max_jobs);
                self.with_assets(set, |asset_dir| processor.process(&asset_dir, &output_dir))
            }
            SetKind::Fluentui => {
                let processor = FluentuiProcessor::new(
                    &self.tables,
                    self.rasterizer.as_ref(),
                    self.config.raster.size,
                    self.config.raster.max_jobs,
                );
                self.with_assets(set, |asset_dir| processor.process(&asset_dir, &output_dir))
            }
        }
    }

    fn with_assets<F>(&self, set: &SetConfig, body: F) -> Result<ProcessReport>
    where
        F: FnOnce(PathBuf) -> Result<ProcessReport>,
    {
        let source = set
            .source
            .as_deref()
            .with_context(|| format!("Set '{}' has no source", set.name))?;
        let subdir = set
            .asset_subdir
            .clone()
            .with_context(|| format!("Set '{}' has no asset_subdir", set.name))?;

        self.acquirer
            .with_extracted(source, |root| body(root.join(subdir)))
            .with_context(|| format!("Failed to process set '{}'", set.name))
    }

    /// Expands aliases in the selected sets (all when `only` is empty).
    pub fn expand_aliases(&self, only: &[String]) -> Result<Vec<AliasOutcome>> {
        let expander = AliasExpander::new(self.tables.aliases());
        self.select_sets(only)?
            .into_iter()
            .map(|set| {
                let report = expander.expand(&self.config.set_dir(&set.name))?;
                info!(
                    set = %set.name,
                    created = report.created,
                    existing = report.existing,
                    "Expanded aliases"
                );
                Ok(AliasOutcome {
                    set: set.name.clone(),
                    report,
                })
            })
            .collect()
    }

    /// Copies reference assets missing from every other set.
    pub fn synchronize(&self) -> Result<Vec<SyncReport>> {
        let targets: Vec<PathBuf> = self
            .config
            .sets
            .iter()
            .filter(|set| !set.is_reference())
            .map(|set| self.config.set_dir(&set.name))
            .collect();

        CrossSetSynchronizer::new(self.config.reference_dir()).sync(&targets)
    }

    /// Coverage of every non-reference set against the reference.
    pub fn coverage(&self) -> Result<Vec<CoverageReport>> {
        let reference = SetInventory::scan(&self.config.reference_dir())?;
        if reference.is_empty() {
            anyhow::bail!(
                "Reference set '{REFERENCE_SET}' is empty at {}",
                self.config.reference_dir().display()
            );
        }

        self.config
            .sets
            .iter()
            .filter(|set| !set.is_reference())
            .map(|set| {
                let inventory = SetInventory::scan(&self.config.set_dir(&set.name))?;
                Ok(inventory.coverage(&set.name, &reference))
            })
            .collect()
    }

    /// Runs the full build for the selected sets.
    ///
    /// A set that fails to process is recorded in the report and does not
    /// stop the remaining sets. Alias expansion and synchronization then run
    /// over every configured set; synchronization is skipped while the
    /// reference set has not been built.
    pub fn run(&self, only: &[String]) -> Result<BuildReport> {
        let started_at = Utc::now();
        let selected = self.select_sets(only)?;

        let mut sets = Vec::with_capacity(selected.len());
        for set in selected {
            let (report, error) = match self.process_set(set) {
                Ok(report) => (Some(report), None),
                Err(e) => {
                    error!(set = %set.name, "Set failed: {e:#}");
                    (None, Some(format!("{e:#}")))
                }
            };
            sets.push(SetOutcome {
                name: set.name.clone(),
                kind: set.kind,
                report,
                error,
            });
        }

        let aliases = self.expand_aliases(&[])?;
        let sync = if self.config.reference_dir().is_dir() {
            self.synchronize().context("Failed to synchronize sets")?
        } else {
            warn!(
                reference = %self.config.reference_dir().display(),
                "Reference set missing, skipping synchronization"
            );
            Vec::new()
        };

        let report = BuildReport {
            started_at,
            finished_at: Utc::now(),
            sets,
            aliases,
            sync,
        };
        info!(
            sets = report.sets.len(),
            failed = report.failed_sets().len(),
            "Build finished"
        );
        Ok(report)
    }
}
