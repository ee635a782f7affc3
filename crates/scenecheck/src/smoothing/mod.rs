//! Temporal smoothing of annotation fields within scenes.
//!
//! The [`TemporalSmoother`] works on one value sequence. A [`SmoothingPlan`]
//! resolves the configured fields against a table and applies the smoother
//! to every field of one scene, producing a [`SceneCorrection`] that can be
//! computed on any thread and applied to the table afterwards.

mod segment;
mod smoother;

use std::collections::HashMap;

use crate::config::EngineConfig;
use crate::error::Stage;
use crate::input::{DataTable, MISSING};
use crate::report::ReportFragment;

pub use segment::{Segment, segments};
pub use smoother::{FlagKind, SegmentFlag, SmoothOutcome, TemporalSmoother};

/// Smoothing flags by field, then by row index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SmoothingFlags {
    by_field: HashMap<String, HashMap<usize, FlagKind>>,
}

impl SmoothingFlags {
    /// Create an empty flag set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Flag a row. A row keeps its first flag.
    pub fn insert(&mut self, field: &str, row: usize, kind: FlagKind) {
        self.by_field
            .entry(field.to_string())
            .or_default()
            .entry(row)
            .or_insert(kind);
    }

    /// Flag for a row, if any.
    pub fn get(&self, field: &str, row: usize) -> Option<FlagKind> {
        self.by_field.get(field)?.get(&row).copied()
    }

    /// Number of flagged rows for a field.
    pub fn count(&self, field: &str) -> usize {
        self.by_field.get(field).map_or(0, HashMap::len)
    }

    /// Whether no row is flagged.
    pub fn is_empty(&self) -> bool {
        self.by_field.values().all(HashMap::is_empty)
    }

    /// Add another flag set.
    pub fn merge(&mut self, other: SmoothingFlags) {
        for (field, rows) in other.by_field {
            let target = self.by_field.entry(field).or_default();
            for (row, kind) in rows {
                target.entry(row).or_insert(kind);
            }
        }
    }
}

/// A field resolved to a column with its smoother.
#[derive(Debug, Clone)]
pub struct FieldPlan {
    pub field: String,
    pub column: usize,
    pub smoother: TemporalSmoother,
}

/// One cell overwritten by a flip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellUpdate {
    pub row: usize,
    pub column: usize,
    pub value: String,
}

/// Corrections and flags for one scene.
#[derive(Debug, Clone, Default)]
pub struct SceneCorrection {
    pub updates: Vec<CellUpdate>,
    pub flags: SmoothingFlags,
    pub fragment: ReportFragment,
}

impl SceneCorrection {
    /// Write the updates into the table, returning the flags and counters.
    pub fn apply(self, table: &mut DataTable) -> (SmoothingFlags, ReportFragment) {
        for update in &self.updates {
            table.set(update.row, update.column, &update.value);
        }
        (self.flags, self.fragment)
    }
}

/// Smoothed fields resolved against a table.
#[derive(Debug, Clone, Default)]
pub struct SmoothingPlan {
    fields: Vec<FieldPlan>,
}

impl SmoothingPlan {
    /// Resolve `config.smoothing.fields`. Fields whose column is absent are
    /// dropped with a warning.
    pub fn resolve(table: &DataTable, config: &EngineConfig) -> (Self, ReportFragment) {
        let mut fragment = ReportFragment::new();
        let mut fields = Vec::new();

        for name in &config.smoothing.fields {
            let Some(column) = config.field(name).and_then(|spec| spec.column.as_deref()) else {
                continue;
            };
            let Some(index) = table.column_index(column) else {
                fragment.warn_missing_column(Stage::Smooth, column);
                continue;
            };
            fields.push(FieldPlan {
                field: name.clone(),
                column: index,
                smoother: TemporalSmoother::new(config.thresholds_for(name)),
            });
        }

        (Self { fields }, fragment)
    }

    /// Resolved fields.
    pub fn fields(&self) -> &[FieldPlan] {
        &self.fields
    }

    /// Whether nothing will be smoothed.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Smooth every planned field over one scene's rows, in frame order.
    pub fn smooth_scene(&self, table: &DataTable, rows: &[usize]) -> SceneCorrection {
        let mut correction = SceneCorrection::default();

        for plan in &self.fields {
            let values: Vec<&str> = rows
                .iter()
                .map(|&row| table.get(row, plan.column).unwrap_or(MISSING))
                .collect();
            let outcome = plan.smoother.smooth(&values);

            for (pos, (&row, new)) in rows.iter().zip(&outcome.values).enumerate() {
                if values[pos] != new.as_str() {
                    correction.updates.push(CellUpdate {
                        row,
                        column: plan.column,
                        value: new.clone(),
                    });
                }
            }
            for flag in &outcome.flags {
                for &pos in &flag.positions {
                    correction.flags.insert(&plan.field, rows[pos], flag.kind);
                }
            }

            let counts = correction.fragment.smoothing_mut(&plan.field);
            counts.segments_flipped += outcome.flip_count;
            counts.values_flipped += outcome.values_flipped;
            counts.segments_flagged_short += outcome.flag_count;
            counts.segments_flagged_boundary += outcome.boundary_count();
        }

        correction
    }
}
