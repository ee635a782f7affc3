//! Canonicalization of raw model answers.
//!
//! Runs before smoothing so that segments are computed over canonical
//! values: `Yes (partial)` and `Yes` must not form two segments.

mod binary;
mod categorical;
mod lanes;
mod normalizer;

pub use binary::{BinaryValue, canonicalize_binary};
pub use categorical::{Consolidated, consolidate};
pub use lanes::{LaneCount, parse_lane_count};
pub use normalizer::CategoricalNormalizer;
