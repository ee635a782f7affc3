//! Run report: counters for corrections and violations.
//!
//! Stages and scenes each produce a [`ReportFragment`]; the
//! [`ReportAggregator`] reduces them into one immutable [`Report`].

mod fragment;

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use fragment::{NormalizationCounts, ReportFragment, SmoothingCounts, Warning};

use crate::config::Thresholds;
use crate::error::{Result, SceneCheckError};

/// Value of the report's `sequence_checks` entry when scenes were grouped.
pub const SEQUENCE_CHECKS_ENABLED: &str = "enabled";
/// Value when the scene column was missing.
pub const SEQUENCE_CHECKS_SKIPPED: &str = "skipped (no scene column)";

/// Facts about the run recorded alongside the counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunInfo {
    /// Rows in the input table.
    pub rows: usize,
    /// Scenes found by the sequencer.
    pub scenes: usize,
    /// Global thresholds.
    pub thresholds: Thresholds,
    /// Hash of the input file, when the table came from one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_hash: Option<String>,
}

/// Summary of one engine run. Read-only once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    generated_at: DateTime<Utc>,
    #[serde(flatten)]
    run: RunInfo,
    sequence_checks: String,
    #[serde(flatten)]
    counts: ReportFragment,
}

impl Report {
    /// When the report was built.
    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    /// Run facts.
    pub fn run(&self) -> &RunInfo {
        &self.run
    }

    /// `enabled` or `skipped (no scene column)`.
    pub fn sequence_checks(&self) -> &str {
        &self.sequence_checks
    }

    /// All counters.
    pub fn counts(&self) -> &ReportFragment {
        &self.counts
    }

    /// Total segments flipped across fields.
    pub fn total_flips(&self) -> usize {
        self.counts.smoothing.values().map(|c| c.segments_flipped).sum()
    }

    /// Total segments flagged across fields.
    pub fn total_flags(&self) -> usize {
        self.counts.smoothing.values().map(|c| c.segments_flagged()).sum()
    }

    /// Total non-OK statuses across check groups.
    pub fn total_violations(&self) -> usize {
        self.counts
            .violations
            .values()
            .flat_map(|reasons| reasons.values())
            .sum()
    }

    /// Violation count for one reason in one group.
    pub fn violation_count(&self, group: &str, reason: &str) -> usize {
        self.counts
            .violations
            .get(group)
            .and_then(|r| r.get(reason))
            .copied()
            .unwrap_or(0)
    }

    /// Save as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| SceneCheckError::Io {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }
        let file = File::create(path).map_err(|e| SceneCheckError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }

    /// Load a saved report.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| SceneCheckError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}

/// Reduces report fragments. The reduction is order-independent.
pub struct ReportAggregator;

impl ReportAggregator {
    /// Merge any number of fragments.
    pub fn aggregate(fragments: impl IntoIterator<Item = ReportFragment>) -> ReportFragment {
        fragments
            .into_iter()
            .fold(ReportFragment::new(), ReportFragment::merged)
    }

    /// Merge fragments and seal them into a report.
    pub fn finish(run: RunInfo, fragments: impl IntoIterator<Item = ReportFragment>) -> Report {
        let counts = Self::aggregate(fragments);
        let skipped = counts
            .warnings
            .iter()
            .any(|w| matches!(w, Warning::SequenceChecksSkipped { .. }));

        Report {
            generated_at: Utc::now(),
            run,
            sequence_checks: if skipped {
                SEQUENCE_CHECKS_SKIPPED
            } else {
                SEQUENCE_CHECKS_ENABLED
            }
            .to_string(),
            counts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_info() -> RunInfo {
        RunInfo {
            rows: 10,
            scenes: 2,
            thresholds: Thresholds::new(2, 4),
            source_hash: None,
        }
    }

    #[test]
    fn test_aggregate_is_associative() {
        let mut a = ReportFragment::new();
        a.record_violation("lanes", "NumberOfLanes jump");
        let mut b = ReportFragment::new();
        b.smoothing_mut("Divided").segments_flipped = 2;
        let mut c = ReportFragment::new();
        c.record_violation("lanes", "NumberOfLanes jump");
        c.rows_normalized = 3;

        let left = ReportAggregator::aggregate([a.clone().merged(b.clone()), c.clone()]);
        let right = ReportAggregator::aggregate([a, b.merged(c)]);
        assert_eq!(left, right);
        assert_eq!(left.violations["lanes"]["NumberOfLanes jump"], 2);
    }

    #[test]
    fn test_finish_reports_sequence_status() {
        let mut f = ReportFragment::new();
        f.warnings.insert(Warning::SequenceChecksSkipped {
            column: "Scene".to_string(),
        });
        let report = ReportAggregator::finish(run_info(), [f]);
        assert_eq!(report.sequence_checks(), SEQUENCE_CHECKS_SKIPPED);

        let report = ReportAggregator::finish(run_info(), []);
        assert_eq!(report.sequence_checks(), SEQUENCE_CHECKS_ENABLED);
        assert_eq!(report.total_violations(), 0);
    }

    #[test]
    fn test_report_json_round_trip() {
        let mut f = ReportFragment::new();
        f.record_violation("Illumination", "Day/Night both equal");
        f.smoothing_mut("Day").segments_flagged_short = 1;
        let report = ReportAggregator::finish(run_info(), [f]);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["rows"], 10);
        assert_eq!(json["violations"]["Illumination"]["Day/Night both equal"], 1);
        assert_eq!(json["sequence_checks"], "enabled");

        let back: Report = serde_json::from_value(json).unwrap();
        assert_eq!(back, report);
        assert_eq!(back.total_flags(), 1);
    }
}
