//! Vendor set processors.
//!
//! Each processor reads one vendor's raw assets and writes canonical
//! `<name>.png` / `<name>/<level>.png` files into that vendor's output
//! directory:
//!
//! - [`CodepointsProcessor`]: PNG files named by hex codepoints
//! - [`UnicodeHtmlProcessor`]: Unicode charts with inline base64 images
//! - [`FluentuiProcessor`]: per-emoji directories with metadata and SVGs
//!
//! Per-item problems (undecodable names, unknown emoji, bad metadata,
//! rasterizer failures) are counted and skipped. Only problems with the
//! input as a whole are returned as errors.

pub mod codepoints;
pub mod fluentui;
pub mod unicode_html;

pub use codepoints::CodepointsProcessor;
pub use fluentui::FluentuiProcessor;
pub use unicode_html::UnicodeHtmlProcessor;

use serde::Serialize;
use std::ops::AddAssign;

/// What happened to a single asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// An output file was written
    Written,
    /// The asset was not applicable and was ignored
    Skipped,
    /// Writing the asset failed
    Failed,
}

/// Counts of asset outcomes for one processing run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProcessReport {
    /// Files written
    pub written: usize,
    /// Assets ignored (undecodable, unknown, ineligible)
    pub skipped: usize,
    /// Assets whose output could not be produced
    pub failed: usize,
}

impl ProcessReport {
    /// Counts one outcome.
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Written => self.written += 1,
            Outcome::Skipped => self.skipped += 1,
            Outcome::Failed => self.failed += 1,
        }
    }

    /// Total number of assets seen.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.written + self.skipped + self.failed
    }
}

impl AddAssign for ProcessReport {
    fn add_assign(&mut self, other: Self) {
        self.written += other.written;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}

impl FromIterator<Outcome> for ProcessReport {
    fn from_iter<I: IntoIterator<Item = Outcome>>(iter: I) -> Self {
        let mut report = Self::default();
        for outcome in iter {
            report.record(outcome);
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_from_outcomes() {
        let mut report: ProcessReport = [Outcome::Written, Outcome::Skipped, Outcome::Written]
            .into_iter()
            .collect();
        report += ProcessReport {
            written: 0,
            skipped: 0,
            failed: 1,
        };

        assert_eq!(report.written, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.total(), 4);
    }
}
