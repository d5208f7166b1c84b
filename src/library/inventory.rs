//! Inventory of the assets present in one set directory.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use super::fsops::{file_name_str, file_stem_str, png_files, subdirectories};
use crate::models::{Asset, ToneLevel};

/// Names and tones found in a set directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetInventory {
    bases: BTreeSet<String>,
    tones: BTreeMap<String, BTreeSet<ToneLevel>>,
}

/// Missing assets of one set relative to the reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoverageReport {
    /// Set name
    pub set: String,
    /// Assets present in the set
    pub present: usize,
    /// Reference assets absent from the set
    pub missing: Vec<Asset>,
}

impl CoverageReport {
    /// Returns true if nothing is missing.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

impl SetInventory {
    /// Scans `set_dir`. A directory that does not exist yet is empty.
    pub fn scan(set_dir: &Path) -> Result<Self> {
        let mut inventory = Self::default();
        if !set_dir.is_dir() {
            return Ok(inventory);
        }

        let context = || format!("Failed to scan set directory {}", set_dir.display());

        for file in png_files(set_dir).with_context(context)? {
            if let Some(stem) = file_stem_str(&file) {
                inventory.bases.insert(stem.to_string());
            }
        }

        for dir in subdirectories(set_dir).with_context(context)? {
            let Some(name) = file_name_str(&dir) else {
                continue;
            };
            let levels = png_files(&dir)
                .with_context(context)?
                .iter()
                .filter_map(|file| file_name_str(file).and_then(ToneLevel::from_file_name))
                .collect();
            inventory.tones.insert(name.to_string(), levels);
        }

        Ok(inventory)
    }

    /// Names with a base file.
    #[must_use]
    pub fn bases(&self) -> &BTreeSet<String> {
        &self.bases
    }

    /// Names with a base file or a tone directory.
    #[must_use]
    pub fn names(&self) -> BTreeSet<&str> {
        self.bases
            .iter()
            .chain(self.tones.keys())
            .map(String::as_str)
            .collect()
    }

    /// Every asset in the set, sorted.
    #[must_use]
    pub fn assets(&self) -> BTreeSet<Asset> {
        let bases = self.bases.iter().map(Asset::base);
        let toned = self.tones.iter().flat_map(|(name, levels)| {
            levels.iter().map(move |level| Asset::toned(name.clone(), *level))
        });
        bases.chain(toned).collect()
    }

    /// Returns true if `asset` is present.
    #[must_use]
    pub fn contains(&self, asset: &Asset) -> bool {
        match asset.tone {
            None => self.bases.contains(&asset.name),
            Some(level) => self
                .tones
                .get(&asset.name)
                .is_some_and(|levels| levels.contains(&level)),
        }
    }

    /// Number of assets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bases.len() + self.tones.values().map(BTreeSet::len).sum::<usize>()
    }

    /// Returns true if the set holds no assets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reference assets not present in this set.
    #[must_use]
    pub fn missing_from(&self, reference: &Self) -> Vec<Asset> {
        reference
            .assets()
            .into_iter()
            .filter(|asset| !self.contains(asset))
            .collect()
    }

    /// Coverage of this set (named `set`) against `reference`.
    #[must_use]
    pub fn coverage(&self, set: &str, reference: &Self) -> CoverageReport {
        CoverageReport {
            set: set.to_string(),
            present: self.len(),
            missing: self.missing_from(reference),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_scan_bases_and_tones() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("wave.png"), b"").unwrap();
        fs::create_dir(temp.path().join("wave")).unwrap();
        fs::write(temp.path().join("wave/1.png"), b"").unwrap();
        fs::write(temp.path().join("wave/5.png"), b"").unwrap();
        fs::write(temp.path().join("wave/9.png"), b"").unwrap();
        fs::create_dir(temp.path().join("runner")).unwrap();

        let inventory = SetInventory::scan(temp.path()).unwrap();

        assert_eq!(inventory.len(), 3);
        assert!(inventory.contains(&Asset::base("wave")));
        assert!(inventory.contains(&Asset::toned("wave", ToneLevel::new(5).unwrap())));
        assert!(!inventory.contains(&Asset::base("runner")));
        assert_eq!(inventory.names().into_iter().collect::<Vec<_>>(), ["runner", "wave"]);
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let temp = TempDir::new().unwrap();
        let inventory = SetInventory::scan(&temp.path().join("absent")).unwrap();
        assert!(inventory.is_empty());
    }

    #[test]
    fn test_coverage_against_reference() {
        let reference_dir = TempDir::new().unwrap();
        fs::write(reference_dir.path().join("a.png"), b"").unwrap();
        fs::write(reference_dir.path().join("b.png"), b"").unwrap();

        let set_dir = TempDir::new().unwrap();
        fs::write(set_dir.path().join("a.png"), b"").unwrap();
        fs::write(set_dir.path().join("vendor_only.png"), b"").unwrap();

        let reference = SetInventory::scan(reference_dir.path()).unwrap();
        let set = SetInventory::scan(set_dir.path()).unwrap();
        let report = set.coverage("twemoji", &reference);

        assert!(!report.is_complete());
        assert_eq!(report.present, 2);
        assert_eq!(report.missing, vec![Asset::base("b")]);
    }
}
