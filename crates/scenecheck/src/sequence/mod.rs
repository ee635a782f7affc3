//! Grouping of frames into scenes.
//!
//! A scene is the ordered list of row indices sharing one scene id. Scenes
//! keep first-appearance order so per-scene work can be reassembled
//! deterministically.

use std::cmp::Ordering;

use indexmap::IndexMap;

use crate::error::Stage;
use crate::input::DataTable;
use crate::report::{ReportFragment, Warning};
use crate::schema::is_missing;

/// Scene id to ordered row indices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SceneGrouping {
    scenes: IndexMap<String, Vec<usize>>,
    enabled: bool,
}

impl SceneGrouping {
    /// Grouping for a table without a scene column.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Whether the scene column was present.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Number of scenes.
    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    /// Whether there are no scenes.
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// Row indices of one scene, in frame order.
    pub fn rows(&self, scene: &str) -> Option<&[usize]> {
        self.scenes.get(scene).map(Vec::as_slice)
    }

    /// Scenes in first-appearance order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[usize])> {
        self.scenes.iter().map(|(id, rows)| (id.as_str(), rows.as_slice()))
    }
}

/// Sorts frames into scenes.
pub struct SceneSequencer;

impl Default for SceneSequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneSequencer {
    /// Create a new sequencer.
    pub fn new() -> Self {
        Self
    }

    /// Group rows by `scene_col`, ordering each scene by `order_col`.
    ///
    /// A missing scene column yields a disabled grouping and a
    /// [`Warning::SequenceChecksSkipped`]; whether that is fatal is the
    /// caller's decision.
    pub fn group(
        &self,
        table: &DataTable,
        scene_col: &str,
        order_col: Option<&str>,
    ) -> (SceneGrouping, ReportFragment) {
        let mut fragment = ReportFragment::new();

        let Some(scene_idx) = table.column_index(scene_col) else {
            tracing::warn!(column = %scene_col, "Scene column not found, skipping sequence checks");
            fragment.warnings.insert(Warning::SequenceChecksSkipped {
                column: scene_col.to_string(),
            });
            return (SceneGrouping::disabled(), fragment);
        };

        let order_idx = order_col.and_then(|col| {
            let idx = table.column_index(col);
            if idx.is_none() {
                tracing::warn!(column = %col, "Order column not found, using row order");
                fragment.warnings.insert(Warning::OrderColumnMissing {
                    column: col.to_string(),
                });
            }
            idx
        });

        let mut scenes: IndexMap<String, Vec<usize>> = IndexMap::new();
        let mut orphans = 0;
        for (row, id) in table.column_values(scene_idx).enumerate() {
            if is_missing(id) {
                orphans += 1;
                continue;
            }
            scenes.entry(id.trim().to_string()).or_default().push(row);
        }

        if orphans > 0 {
            tracing::warn!(rows = orphans, "Rows without a scene id are excluded from scenes");
            fragment
                .warnings
                .insert(Warning::RowsWithoutScene { count: orphans });
        }

        if let Some(order_idx) = order_idx {
            for rows in scenes.values_mut() {
                sort_frames(table, order_idx, rows);
            }
        }

        tracing::debug!(stage = %Stage::Sequence, scenes = scenes.len(), "Scenes grouped");
        (
            SceneGrouping {
                scenes,
                enabled: true,
            },
            fragment,
        )
    }
}

/// Sort key of one frame-order cell.
///
/// Numbers sort before text, and missing cells sort last.
#[derive(Debug, Clone, PartialEq)]
enum FrameKey<'a> {
    Number(f64),
    Text(&'a str),
    Missing,
}

impl<'a> FrameKey<'a> {
    fn from_cell(cell: &'a str) -> Self {
        if is_missing(cell) {
            return FrameKey::Missing;
        }
        let cell = cell.trim();
        match cell.parse::<f64>() {
            Ok(n) if !n.is_nan() => FrameKey::Number(n),
            _ => FrameKey::Text(cell),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            FrameKey::Number(_) => 0,
            FrameKey::Text(_) => 1,
            FrameKey::Missing => 2,
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (FrameKey::Number(a), FrameKey::Number(b)) => a.total_cmp(b),
            (FrameKey::Text(a), FrameKey::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// Stable sort of one scene's rows by frame order.
///
/// Each cell is compared on its own key, so a stray blank or text cell does
/// not turn numeric frames into a string sort. ISO timestamps sort correctly
/// as text.
fn sort_frames(table: &DataTable, order_idx: usize, rows: &mut [usize]) {
    let mut keyed: Vec<(FrameKey<'_>, usize)> = rows
        .iter()
        .map(|&row| (FrameKey::from_cell(table.get(row, order_idx).unwrap_or("")), row))
        .collect();
    keyed.sort_by(|a, b| a.0.compare(&b.0));
    for (slot, (_, row)) in rows.iter_mut().zip(keyed) {
        *slot = row;
    }
}
