//! Alias expansion within one set directory.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::ops::AddAssign;
use std::path::Path;
use tracing::debug;

use super::fsops::{copy_if_absent, file_name_str, file_stem_str, png_files, subdirectories};

/// Outcome of expanding aliases in one set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExpandReport {
    /// Files copied under an alias name
    pub created: usize,
    /// Targets that already existed and were left alone
    pub existing: usize,
}

impl AddAssign for ExpandReport {
    fn add_assign(&mut self, other: Self) {
        self.created += other.created;
        self.existing += other.existing;
    }
}

/// Copies images to the alias names defined for them.
#[derive(Debug, Clone, Copy)]
pub struct AliasExpander<'a> {
    aliases: &'a HashMap<String, Vec<String>>,
}

impl<'a> AliasExpander<'a> {
    /// Creates an expander over a name → aliases table.
    #[must_use]
    pub const fn new(aliases: &'a HashMap<String, Vec<String>>) -> Self {
        Self { aliases }
    }

    /// Expands aliases in `set_dir`.
    ///
    /// Every name in the set (base file or tone directory) that has aliases
    /// gets its base file copied to `<alias>.png` and its tone files
    /// mirrored into `<alias>/`. An alias that has aliases of its own is
    /// expanded in the same pass. Existing targets are never replaced, so
    /// running this twice leaves the same files as running it once.
    pub fn expand(&self, set_dir: &Path) -> Result<ExpandReport> {
        let mut report = ExpandReport::default();
        if !set_dir.is_dir() {
            return Ok(report);
        }

        let mut seen = Self::names_in(set_dir)?;
        let mut pending: VecDeque<String> = seen.iter().cloned().collect();

        while let Some(name) = pending.pop_front() {
            let Some(aliases) = self.aliases.get(&name) else {
                continue;
            };
            for alias in aliases {
                report += Self::expand_one(set_dir, &name, alias)?;
                if seen.insert(alias.clone()) {
                    pending.push_back(alias.clone());
                }
            }
        }

        debug!(
            set = %set_dir.display(),
            created = report.created,
            existing = report.existing,
            "Expanded aliases"
        );
        Ok(report)
    }

    fn names_in(set_dir: &Path) -> Result<BTreeSet<String>> {
        let context = || format!("Failed to list set directory {}", set_dir.display());
        let bases = png_files(set_dir).with_context(context)?;
        let dirs = subdirectories(set_dir).with_context(context)?;

        Ok(bases
            .iter()
            .filter_map(|file| file_stem_str(file))
            .chain(dirs.iter().filter_map(|dir| file_name_str(dir)))
            .map(str::to_string)
            .collect())
    }

    fn expand_one(set_dir: &Path, name: &str, alias: &str) -> Result<ExpandReport> {
        let mut report = ExpandReport::default();

        let base = set_dir.join(format!("{name}.png"));
        if base.is_file() {
            let target = set_dir.join(format!("{alias}.png"));
            record(&mut report, copy_if_absent(&base, &target), &target)?;
        }

        let tone_dir = set_dir.join(name);
        if tone_dir.is_dir() {
            let alias_dir = set_dir.join(alias);
            let files = png_files(&tone_dir)
                .with_context(|| format!("Failed to list {}", tone_dir.display()))?;
            for file in files {
                let Some(file_name) = file.file_name() else {
                    continue;
                };
                let target = alias_dir.join(file_name);
                record(&mut report, copy_if_absent(&file, &target), &target)?;
            }
        }

        Ok(report)
    }
}

fn record(report: &mut ExpandReport, copied: std::io::Result<bool>, target: &Path) -> Result<()> {
    if copied.with_context(|| format!("Failed to create alias {}", target.display()))? {
        report.created += 1;
    } else {
        report.existing += 1;
    }
    Ok(())
}
