//! Segment-based temporal smoothing of one field over one scene.

use serde::{Deserialize, Serialize};

use crate::config::Thresholds;

use super::segment::{Segment, segments};

/// Why a segment was flagged instead of corrected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagKind {
    /// Interior segment with `n <= length < m`.
    ShortDuration,
    /// First or last segment shorter than `m`.
    BoundaryUnanchored,
}

impl FlagKind {
    /// Reason code written to the smoothing check column.
    pub fn reason(&self) -> &'static str {
        match self {
            FlagKind::ShortDuration => "short-duration, review",
            FlagKind::BoundaryUnanchored => "boundary, unanchored",
        }
    }
}

impl std::fmt::Display for FlagKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.reason())
    }
}

/// A flagged segment. Positions index into the smoothed sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentFlag {
    pub kind: FlagKind,
    pub value: String,
    pub positions: Vec<usize>,
}

/// Result of smoothing one sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmoothOutcome {
    /// Corrected values, same length as the input.
    pub values: Vec<String>,
    /// Interior segments flipped.
    pub flip_count: usize,
    /// Cells changed by flips.
    pub values_flipped: usize,
    /// Interior segments flagged as short-duration.
    pub flag_count: usize,
    /// All flags, short-duration and boundary.
    pub flags: Vec<SegmentFlag>,
}

impl SmoothOutcome {
    /// Boundary segments flagged as unanchored.
    pub fn boundary_count(&self) -> usize {
        self.flags
            .iter()
            .filter(|f| f.kind == FlagKind::BoundaryUnanchored)
            .count()
    }
}

/// Smoother for one `(n, m)` pair.
///
/// Interior segments shorter than `n` take the value of the segment before
/// them; interior segments shorter than `m` are flagged; the first and last
/// segments are never changed.
#[derive(Debug, Clone, Copy)]
pub struct TemporalSmoother {
    thresholds: Thresholds,
}

impl TemporalSmoother {
    /// Create a smoother. Thresholds are expected to be validated.
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    /// Thresholds in use.
    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// Smooth a sequence in one left-to-right pass.
    ///
    /// A flipped segment takes its predecessor's corrected value, so two
    /// adjacent spikes both merge into the same anchor. Missing cells are
    /// skipped and never written.
    pub fn smooth<S: AsRef<str>>(&self, values: &[S]) -> SmoothOutcome {
        let Thresholds { n, m } = self.thresholds;
        let mut out: Vec<String> = values.iter().map(|v| v.as_ref().to_string()).collect();
        let segs = segments(values);
        let mut flip_count = 0;
        let mut values_flipped = 0;
        let mut flags = Vec::new();

        if segs.len() > 2 {
            let mut anchor = segs[0].value.clone();
            for seg in &segs[1..segs.len() - 1] {
                if seg.len() < n {
                    if seg.value != anchor {
                        for &pos in &seg.positions {
                            out[pos] = anchor.clone();
                        }
                        flip_count += 1;
                        values_flipped += seg.len();
                    }
                    continue;
                }
                if seg.len() < m && seg.value != anchor {
                    flags.push(flag(FlagKind::ShortDuration, seg));
                }
                anchor = seg.value.clone();
            }
        }

        let flag_count = flags.len();

        let smoothed = segments(&out);
        if smoothed.len() > 1 {
            for seg in [&smoothed[0], &smoothed[smoothed.len() - 1]] {
                if seg.len() < m {
                    flags.push(flag(FlagKind::BoundaryUnanchored, seg));
                }
            }
        }

        SmoothOutcome {
            values: out,
            flip_count,
            values_flipped,
            flag_count,
            flags,
        }
    }
}

fn flag(kind: FlagKind, seg: &Segment) -> SegmentFlag {
    SegmentFlag {
        kind,
        value: seg.value.clone(),
        positions: seg.positions.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn smoother(n: usize, m: usize) -> TemporalSmoother {
        TemporalSmoother::new(Thresholds::new(n, m))
    }

    #[test]
    fn test_short_interior_flip() {
        let outcome = smoother(2, 4).smooth(&["No", "No", "Yes", "No", "No"]);
        assert_eq!(outcome.values, vec!["No"; 5]);
        assert_eq!(outcome.flip_count, 1);
        assert_eq!(outcome.flag_count, 0);
        assert!(outcome.flags.is_empty());
    }

    #[test]
    fn test_flag_without_flip() {
        let input = ["No", "No", "Yes", "Yes", "Yes", "No", "No"];
        let outcome = smoother(2, 4).smooth(&input);
        assert_eq!(outcome.values, input.to_vec());
        assert_eq!(outcome.flip_count, 0);
        assert_eq!(outcome.flag_count, 1);
        let short: Vec<_> = outcome
            .flags
            .iter()
            .filter(|f| f.kind == FlagKind::ShortDuration)
            .collect();
        assert_eq!(short.len(), 1);
        assert_eq!(short[0].positions, vec![2, 3, 4]);
    }

    #[test]
    fn test_boundary_never_flipped() {
        let input = ["Yes", "No", "No", "No", "No", "No"];
        let outcome = smoother(2, 4).smooth(&input);
        assert_eq!(outcome.values, input.to_vec());
        assert_eq!(outcome.flip_count, 0);
        assert_eq!(outcome.boundary_count(), 1);
        assert_eq!(outcome.flags[0].kind, FlagKind::BoundaryUnanchored);
        assert_eq!(outcome.flags[0].positions, vec![0]);
    }

    #[test]
    fn test_single_segment_untouched() {
        let outcome = smoother(3, 5).smooth(&["Yes", "Yes"]);
        assert_eq!(outcome.flip_count, 0);
        assert!(outcome.flags.is_empty());
    }

    #[test]
    fn test_adjacent_spikes_merge_into_anchor() {
        let input = ["A", "A", "A", "B", "C", "D", "D", "D"];
        let outcome = smoother(3, 3).smooth(&input);
        assert_eq!(outcome.values, vec!["A", "A", "A", "A", "A", "D", "D", "D"]);
        assert_eq!(outcome.flip_count, 2);
        assert_eq!(outcome.values_flipped, 2);
    }

    #[test]
    fn test_missing_cells_preserved() {
        let outcome = smoother(2, 2).smooth(&["No", "No", "", "Yes", "No", "No"]);
        assert_eq!(outcome.values, vec!["No", "No", "", "No", "No", "No"]);
        assert_eq!(outcome.flip_count, 1);
    }

    #[test]
    fn test_idempotent() {
        let input = ["1", "2", "2", "3", "1", "1", "1", "4", "4", "2", "2", "2", "2"];
        let s = smoother(2, 3);
        let once = s.smooth(&input);
        let twice = s.smooth(&once.values);
        assert_eq!(twice.values, once.values);
        assert_eq!(twice.flip_count, 0);
    }
}
