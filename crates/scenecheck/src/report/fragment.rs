//! Report fragments produced by each stage and scene.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::Stage;

/// Counters for one normalized field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizationCounts {
    /// Cells whose value was canonicalized to a different spelling.
    pub normalized: usize,
    /// Cells that could not be coerced and were replaced by the missing sentinel.
    pub unparseable: usize,
    /// Cells outside the closed value set.
    pub unmapped: usize,
    /// Cells defaulted to `No` because their prerequisite is absent.
    pub defaulted: usize,
}

impl NormalizationCounts {
    fn add(&mut self, other: &Self) {
        self.normalized += other.normalized;
        self.unparseable += other.unparseable;
        self.unmapped += other.unmapped;
        self.defaulted += other.defaulted;
    }

    /// Whether every counter is zero.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Counters for one smoothed field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmoothingCounts {
    /// Interior segments overwritten with the preceding value.
    pub segments_flipped: usize,
    /// Cells changed by those flips.
    pub values_flipped: usize,
    /// Interior segments kept but flagged as short.
    pub segments_flagged_short: usize,
    /// Boundary segments flagged as unanchored.
    pub segments_flagged_boundary: usize,
}

impl SmoothingCounts {
    fn add(&mut self, other: &Self) {
        self.segments_flipped += other.segments_flipped;
        self.values_flipped += other.values_flipped;
        self.segments_flagged_short += other.segments_flagged_short;
        self.segments_flagged_boundary += other.segments_flagged_boundary;
    }

    /// Total flagged segments.
    pub fn segments_flagged(&self) -> usize {
        self.segments_flagged_short + self.segments_flagged_boundary
    }
}

/// Non-fatal condition recorded instead of failing the run.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// A configured column is absent; the affected step was skipped.
    MissingColumn { stage: Stage, column: String },
    /// No scene column, so scene-aware stages did nothing.
    SequenceChecksSkipped { column: String },
    /// The order column is absent; input row order was used.
    OrderColumnMissing { column: String },
    /// Rows with an empty scene id take part in no scene.
    RowsWithoutScene { count: usize },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::MissingColumn { stage, column } => {
                write!(f, "{stage}: column '{column}' not found (skipped)")
            }
            Warning::SequenceChecksSkipped { column } => {
                write!(f, "sequence_checks: skipped (no scene column) [{column}]")
            }
            Warning::OrderColumnMissing { column } => {
                write!(f, "sequence: order column '{column}' not found, using row order")
            }
            Warning::RowsWithoutScene { count } => {
                write!(f, "sequence: {count} rows have no scene id")
            }
        }
    }
}

/// Counters from one unit of work (a stage, a scene, or a whole run).
///
/// Merging is counter addition keyed by field or rule name, plus set union
/// of warnings, so fragments can be combined in any order or grouping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportFragment {
    /// Rows in which normalization changed at least one cell.
    pub rows_normalized: usize,
    /// Normalization counters per logical field.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub normalization: BTreeMap<String, NormalizationCounts>,
    /// Cells forced to `No`, per forced-absence column. These columns have
    /// no field binding, so they are keyed by column name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub forced: BTreeMap<String, usize>,
    /// Smoothing counters per field.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub smoothing: BTreeMap<String, SmoothingCounts>,
    /// Violation counts per check group, then per reason code.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub violations: BTreeMap<String, BTreeMap<String, usize>>,
    /// Non-fatal conditions.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub warnings: BTreeSet<Warning>,
}

impl ReportFragment {
    /// Create an empty fragment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mutable normalization counters for a field.
    pub fn normalization_mut(&mut self, field: &str) -> &mut NormalizationCounts {
        self.normalization.entry(field.to_string()).or_default()
    }

    /// Mutable smoothing counters for a field.
    pub fn smoothing_mut(&mut self, field: &str) -> &mut SmoothingCounts {
        self.smoothing.entry(field.to_string()).or_default()
    }

    /// Count one violation.
    pub fn record_violation(&mut self, group: &str, reason: &str) {
        *self
            .violations
            .entry(group.to_string())
            .or_default()
            .entry(reason.to_string())
            .or_insert(0) += 1;
    }

    /// Record a missing column.
    pub fn warn_missing_column(&mut self, stage: Stage, column: &str) {
        tracing::warn!(stage = %stage, column = %column, "Configured column not found, skipping");
        self.warnings.insert(Warning::MissingColumn {
            stage,
            column: column.to_string(),
        });
    }

    /// Add another fragment's counters into this one.
    pub fn merge(&mut self, other: ReportFragment) {
        self.rows_normalized += other.rows_normalized;
        for (field, counts) in other.normalization {
            self.normalization.entry(field).or_default().add(&counts);
        }
        for (column, count) in other.forced {
            *self.forced.entry(column).or_insert(0) += count;
        }
        for (field, counts) in other.smoothing {
            self.smoothing.entry(field).or_default().add(&counts);
        }
        for (group, reasons) in other.violations {
            let target = self.violations.entry(group).or_default();
            for (reason, count) in reasons {
                *target.entry(reason).or_insert(0) += count;
            }
        }
        self.warnings.extend(other.warnings);
    }

    /// Consume and merge.
    pub fn merged(mut self, other: ReportFragment) -> Self {
        self.merge(other);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragment(group: &str, reason: &str, flips: usize) -> ReportFragment {
        let mut f = ReportFragment::new();
        f.record_violation(group, reason);
        f.smoothing_mut("Divided").segments_flipped = flips;
        f.normalization_mut("Lanes").unparseable = flips;
        f.forced.insert("Scenery.SpecialStructures.Tunnels".to_string(), flips);
        f
    }

    #[test]
    fn test_merge_adds_counters() {
        let merged = fragment("lanes", "NumberOfLanes jump", 1)
            .merged(fragment("lanes", "NumberOfLanes jump", 2));
        assert_eq!(merged.violations["lanes"]["NumberOfLanes jump"], 2);
        assert_eq!(merged.smoothing["Divided"].segments_flipped, 3);
        assert_eq!(merged.normalization["Lanes"].unparseable, 3);
        assert_eq!(merged.forced["Scenery.SpecialStructures.Tunnels"], 3);
    }

    #[test]
    fn test_merge_is_commutative() {
        let a = fragment("g1", "r1", 1);
        let mut b = fragment("g2", "r2", 4);
        b.warnings.insert(Warning::RowsWithoutScene { count: 2 });
        assert_eq!(a.clone().merged(b.clone()), b.merged(a));
    }

    #[test]
    fn test_warning_display() {
        let w = Warning::SequenceChecksSkipped {
            column: "Scene".to_string(),
        };
        assert!(w.to_string().starts_with("sequence_checks: skipped"));
    }
}
