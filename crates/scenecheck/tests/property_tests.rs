//! Property-based tests for the scenecheck pipeline.
//!
//! These tests use proptest to generate random annotation sequences and
//! tables and verify that the smoother and the engine keep their
//! invariants under all of them.
//!
//! # Running Property Tests
//!
//! ```bash
//! cargo test -p scenecheck --test property_tests
//!
//! # More cases (slower but more thorough)
//! PROPTEST_CASES=10000 cargo test -p scenecheck --test property_tests
//! ```

use proptest::prelude::*;

use scenecheck::normalize::{BinaryValue, LaneCount, canonicalize_binary, parse_lane_count};
use scenecheck::smoothing::segments;
use scenecheck::{
    DataTable, Engine, EngineConfig, FieldSpec, ReportFragment, TemporalSmoother, Thresholds,
};

// =============================================================================
// Test Strategies
// =============================================================================

/// A binary annotation cell, possibly missing.
fn binary_cell() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => Just("Yes".to_string()),
        4 => Just("No".to_string()),
        1 => Just(String::new()),
    ]
}

/// A per-frame sequence of binary cells.
fn binary_sequence() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(binary_cell(), 0..40)
}

/// A per-frame sequence over a four-state field, so spikes can land on
/// neighbors that differ from each other.
fn multi_state_sequence() -> impl Strategy<Value = Vec<String>> {
    let cell = prop_oneof![
        3 => Just("A".to_string()),
        3 => Just("B".to_string()),
        3 => Just("C".to_string()),
        3 => Just("D".to_string()),
        1 => Just(String::new()),
    ];
    prop::collection::vec(cell, 0..40)
}

/// Thresholds with `0 < n <= m`.
fn thresholds() -> impl Strategy<Value = Thresholds> {
    (1usize..5, 0usize..4).prop_map(|(n, extra)| Thresholds::new(n, n + extra))
}

/// Arbitrary text, including model-style free-form answers.
fn free_text() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9 ,.()\\-]{0,40}",
        "(yes|no|Yes|No|YES|NO)[ ,.(a-z)]{0,20}",
        "[0-9]{1,3}( lanes?)?",
        any::<String>(),
    ]
}

// =============================================================================
// Smoothing Properties
// =============================================================================

proptest! {
    /// Smoothing an already smoothed sequence changes nothing.
    #[test]
    fn smoothing_is_idempotent(values in binary_sequence(), t in thresholds()) {
        let smoother = TemporalSmoother::new(t);
        let once = smoother.smooth(&values);
        let twice = smoother.smooth(&once.values);

        prop_assert_eq!(&twice.values, &once.values);
        prop_assert_eq!(twice.flip_count, 0);
    }

    /// No interior segment shorter than `n` survives.
    #[test]
    fn no_short_interior_segment(values in binary_sequence(), t in thresholds()) {
        let outcome = TemporalSmoother::new(t).smooth(&values);
        let segs = segments(&outcome.values);
        if segs.len() > 2 {
            for seg in &segs[1..segs.len() - 1] {
                prop_assert!(seg.len() >= t.n);
            }
        }
    }

    /// Length is preserved and missing cells stay missing.
    #[test]
    fn missing_cells_untouched(values in binary_sequence(), t in thresholds()) {
        let outcome = TemporalSmoother::new(t).smooth(&values);
        prop_assert_eq!(outcome.values.len(), values.len());
        for (before, after) in values.iter().zip(&outcome.values) {
            prop_assert_eq!(before.is_empty(), after.is_empty());
        }
    }

    /// Flip counters agree with the cells that changed.
    #[test]
    fn flip_counts_match_changes(values in binary_sequence(), t in thresholds()) {
        let outcome = TemporalSmoother::new(t).smooth(&values);
        let changed = values
            .iter()
            .zip(&outcome.values)
            .filter(|(before, after)| before != after)
            .count();
        prop_assert_eq!(changed, outcome.values_flipped);
        prop_assert!(outcome.flip_count <= outcome.values_flipped);
    }

    /// Idempotence holds for multi-state fields as well.
    #[test]
    fn multi_state_smoothing_is_idempotent(values in multi_state_sequence(), t in thresholds()) {
        let smoother = TemporalSmoother::new(t);
        let once = smoother.smooth(&values);
        let twice = smoother.smooth(&once.values);

        prop_assert_eq!(&twice.values, &once.values);
        prop_assert_eq!(twice.flip_count, 0);
    }

    /// No short interior segment survives in a multi-state field, and flips
    /// only ever write a value already present in the sequence.
    #[test]
    fn multi_state_no_short_interior(values in multi_state_sequence(), t in thresholds()) {
        let outcome = TemporalSmoother::new(t).smooth(&values);
        let segs = segments(&outcome.values);
        if segs.len() > 2 {
            for seg in &segs[1..segs.len() - 1] {
                prop_assert!(seg.len() >= t.n);
            }
        }
        for value in &outcome.values {
            prop_assert!(values.contains(value));
        }
    }

    /// With `n == 1` nothing is ever flipped.
    #[test]
    fn unit_threshold_never_flips(values in binary_sequence(), m in 1usize..6) {
        let outcome = TemporalSmoother::new(Thresholds::new(1, m)).smooth(&values);
        prop_assert_eq!(&outcome.values, &values);
        prop_assert_eq!(outcome.flip_count, 0);
    }
}

// =============================================================================
// Normalization Properties
// =============================================================================

proptest! {
    /// Binary canonicalization never panics and is stable on its output.
    #[test]
    fn binary_canonicalization_is_stable(raw in free_text()) {
        if let BinaryValue::Value(v) = canonicalize_binary(&raw) {
            prop_assert_eq!(canonicalize_binary(v.as_str()), BinaryValue::Value(v));
        }
    }

    /// Lane counts are never negative.
    #[test]
    fn lane_counts_non_negative(raw in free_text()) {
        if let LaneCount::Count(n) = parse_lane_count(&raw) {
            prop_assert!(n >= 0);
        }
    }
}

// =============================================================================
// Report Properties
// =============================================================================

fn fragment() -> impl Strategy<Value = ReportFragment> {
    prop::collection::vec((0usize..3, 0usize..10, 0usize..10), 0..6).prop_map(|entries| {
        let mut fragment = ReportFragment::new();
        for (field, flips, violations) in entries {
            let name = format!("field{field}");
            fragment.smoothing_mut(&name).segments_flipped += flips;
            for _ in 0..violations {
                fragment.record_violation("group", &name);
            }
            fragment.rows_normalized += flips;
        }
        fragment
    })
}

proptest! {
    /// Merging fragments does not depend on order.
    #[test]
    fn fragment_merge_commutes(a in fragment(), b in fragment()) {
        prop_assert_eq!(a.clone().merged(b.clone()), b.merged(a));
    }
}

// =============================================================================
// Engine Properties
// =============================================================================

fn scene_table() -> impl Strategy<Value = DataTable> {
    prop::collection::vec((0usize..4, binary_cell(), binary_cell()), 1..60).prop_map(|rows| {
        let rows: Vec<Vec<String>> = rows
            .into_iter()
            .enumerate()
            .map(|(frame, (scene, a, b))| vec![format!("s{scene}"), frame.to_string(), a, b])
            .collect();
        DataTable::new(
            vec![
                "Scene".to_string(),
                "Frame".to_string(),
                "divided".to_string(),
                "undivided".to_string(),
            ],
            rows,
            b',',
        )
    })
}

fn engine_config(workers: usize) -> EngineConfig {
    let mut config = EngineConfig::default()
        .with_thresholds(2, 4)
        .with_field("Divided", FieldSpec::binary("divided"))
        .with_field("Undivided", FieldSpec::binary("undivided"));
    config.order_col = Some("Frame".to_string());
    config.smoothing.fields = vec!["Divided".to_string(), "Undivided".to_string()];
    config.workers = workers;
    config
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Row count and input columns are preserved; fan-out does not change results.
    #[test]
    fn engine_preserves_rows(table in scene_table(), workers in 2usize..6) {
        let inline = Engine::new(engine_config(1)).unwrap().run(&table).unwrap();
        let parallel = Engine::new(engine_config(workers)).unwrap().run(&table).unwrap();

        prop_assert_eq!(inline.table.row_count(), table.row_count());
        prop_assert_eq!(&inline.table.headers[..table.column_count()], &table.headers[..]);
        prop_assert_eq!(
            inline.table.column_by_name("Scene"),
            table.column_by_name("Scene")
        );
        prop_assert_eq!(&inline.table, &parallel.table);
        prop_assert_eq!(inline.report.counts(), parallel.report.counts());
    }
}
