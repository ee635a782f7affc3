//! Maximal runs of one value.

use crate::schema::is_missing;

/// A maximal run of identical values, skipping missing cells.
///
/// `positions` index into the sequence the segment was computed from; they
/// are increasing but not necessarily contiguous when missing cells sit
/// inside the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Shared value.
    pub value: String,
    /// Positions of the non-missing cells in the run.
    pub positions: Vec<usize>,
}

impl Segment {
    /// Number of non-missing cells.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Always false; segments hold at least one cell.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// First position.
    pub fn start(&self) -> usize {
        self.positions.first().copied().unwrap_or(0)
    }

    /// Last position.
    pub fn end(&self) -> usize {
        self.positions.last().copied().unwrap_or(0)
    }
}

/// Partition a sequence into segments over its non-missing cells.
pub fn segments<S: AsRef<str>>(values: &[S]) -> Vec<Segment> {
    let mut out: Vec<Segment> = Vec::new();
    for (pos, value) in values.iter().enumerate() {
        let value = value.as_ref();
        if is_missing(value) {
            continue;
        }
        let value = value.trim();
        match out.last_mut() {
            Some(current) if current.value == value => current.positions.push(pos),
            _ => out.push(Segment {
                value: value.to_string(),
                positions: vec![pos],
            }),
        }
    }
    out
}
