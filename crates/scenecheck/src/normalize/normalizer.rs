//! Canonicalizes every bound column before smoothing.

use crate::config::EngineConfig;
use crate::error::Stage;
use crate::input::{DataTable, MISSING};
use crate::report::ReportFragment;
use crate::schema::{Binary, DomainKind, FieldSpec};

use super::binary::{BinaryValue, canonicalize_binary};
use super::categorical::{Consolidated, consolidate};
use super::lanes::{LaneCount, parse_lane_count};

/// Normalizer that rewrites noisy model answers into canonical values.
pub struct CategoricalNormalizer;

impl Default for CategoricalNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl CategoricalNormalizer {
    /// Create a new normalizer.
    pub fn new() -> Self {
        Self
    }

    /// Normalize a copy of `table`.
    ///
    /// Field domains are canonicalized first, then forced-absence columns,
    /// then prerequisite defaulting, so defaulting sees canonical values.
    pub fn normalize(&self, table: &DataTable, config: &EngineConfig) -> (DataTable, ReportFragment) {
        let mut out = table.clone();
        let mut fragment = ReportFragment::new();
        let mut touched = vec![false; out.row_count()];

        for (name, spec) in &config.fields {
            self.normalize_field(&mut out, name, spec, &mut fragment, &mut touched);
        }

        for column in &config.normalization.forced_no {
            let Some(col) = out.column_index(column) else {
                fragment.warn_missing_column(Stage::Normalize, column);
                continue;
            };
            for row in 0..out.row_count() {
                if out.set(row, col, Binary::No.as_str()) {
                    *fragment.forced.entry(column.clone()).or_insert(0) += 1;
                    touched[row] = true;
                }
            }
        }

        for (dependent, prerequisite) in &config.normalization.prerequisites {
            let Some(dep_col) = self.resolve(&out, config, dependent, &mut fragment) else {
                continue;
            };
            let Some(pre_col) = self.resolve(&out, config, prerequisite, &mut fragment) else {
                continue;
            };
            for row in 0..out.row_count() {
                let present = out
                    .get(row, pre_col)
                    .and_then(Binary::from_cell)
                    .is_some_and(|v| v == Binary::Yes);
                if !present && out.set(row, dep_col, Binary::No.as_str()) {
                    fragment.normalization_mut(dependent).defaulted += 1;
                    touched[row] = true;
                }
            }
        }

        fragment.rows_normalized = touched.iter().filter(|t| **t).count();
        tracing::info!(
            rows = out.row_count(),
            rows_normalized = fragment.rows_normalized,
            "Normalization complete"
        );
        (out, fragment)
    }

    fn normalize_field(
        &self,
        table: &mut DataTable,
        name: &str,
        spec: &FieldSpec,
        fragment: &mut ReportFragment,
        touched: &mut [bool],
    ) {
        if spec.domain == DomainKind::List {
            return;
        }

        for column in spec.bound_columns() {
            let Some(col) = table.column_index(column) else {
                fragment.warn_missing_column(Stage::Normalize, column);
                continue;
            };

            for row in 0..table.row_count() {
                let raw = table.get(row, col).unwrap_or(MISSING);
                let (value, unparseable, unmapped) = match (spec.domain, spec.is_one_hot()) {
                    (DomainKind::Binary, _) | (DomainKind::Ordinal, true) => {
                        match canonicalize_binary(raw) {
                            BinaryValue::Value(v) => (Some(v.as_str().to_string()), false, false),
                            BinaryValue::Missing => (None, false, false),
                            BinaryValue::Unmapped => {
                                (Some(Binary::No.as_str().to_string()), false, true)
                            }
                        }
                    }
                    (DomainKind::Numeric, _) => match parse_lane_count(raw) {
                        LaneCount::Count(n) => (Some(n.to_string()), false, false),
                        LaneCount::Missing => (None, false, false),
                        LaneCount::Unparseable => (Some(MISSING.to_string()), true, false),
                    },
                    _ => match consolidate(raw, spec) {
                        Consolidated::Canonical(v) => (Some(v), false, false),
                        Consolidated::Missing => (None, false, false),
                        Consolidated::Unmapped => (None, false, true),
                    },
                };

                let counts = fragment.normalization_mut(name);
                if unparseable {
                    counts.unparseable += 1;
                }
                if unmapped {
                    counts.unmapped += 1;
                }
                if let Some(value) = value {
                    if table.set(row, col, &value) {
                        if !unparseable {
                            fragment.normalization_mut(name).normalized += 1;
                        }
                        touched[row] = true;
                    }
                }
            }
        }

        if fragment.normalization.get(name).is_some_and(|c| c.is_empty()) {
            fragment.normalization.remove(name);
        }
    }

    fn resolve(
        &self,
        table: &DataTable,
        config: &EngineConfig,
        field: &str,
        fragment: &mut ReportFragment,
    ) -> Option<usize> {
        let column = config.field(field)?.column.as_deref()?;
        let index = table.column_index(column);
        if index.is_none() {
            fragment.warn_missing_column(Stage::Normalize, column);
        }
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Warning;

    fn config() -> EngineConfig {
        let mut config = EngineConfig::default()
            .with_field("Parking", FieldSpec::binary("parking"))
            .with_field("Lanes", FieldSpec::numeric("lanes"))
            .with_field(
                "Density",
                FieldSpec::categorical("density", &["Low", "Medium", "High"])
                    .with_synonym("Moderate", "Medium"),
            )
            .with_field("WetRoad", FieldSpec::binary("wet"))
            .with_field("StandingWater", FieldSpec::binary("standing"));
        config.normalization.forced_no = vec!["tunnel".to_string()];
        config
            .normalization
            .prerequisites
            .insert("StandingWater".to_string(), "WetRoad".to_string());
        config
    }

    fn table() -> DataTable {
        DataTable::from_rows(
            &["parking", "lanes", "density", "wet", "standing", "tunnel"],
            &[
                &["Yes (partial)", "two-lane", "Moderate", "Yes", "Yes", "Yes"],
                &["Yes, No", "2", "Low", "No", "Yes", "No"],
                &["Maybe", "lots", "Gridlock", "", "Yes", "No"],
                &["", "1.5", "High", "yes", "No", "No"],
            ],
        )
    }

    #[test]
    fn test_normalize_domains() {
        let (out, fragment) = CategoricalNormalizer::new().normalize(&table(), &config());

        let parking: Vec<&str> = out.column_by_name("parking").unwrap();
        assert_eq!(parking, vec!["Yes", "No", "No", ""]);
        let lanes: Vec<&str> = out.column_by_name("lanes").unwrap();
        assert_eq!(lanes, vec!["2", "2", "", "1"]);
        let density: Vec<&str> = out.column_by_name("density").unwrap();
        assert_eq!(density, vec!["Medium", "Low", "Gridlock", "High"]);

        assert_eq!(fragment.normalization["Lanes"].unparseable, 1);
        assert_eq!(fragment.normalization["Density"].unmapped, 1);
        assert_eq!(fragment.normalization["Parking"].normalized, 3);
    }

    #[test]
    fn test_forced_and_defaulted() {
        let (out, fragment) = CategoricalNormalizer::new().normalize(&table(), &config());

        let tunnel: Vec<&str> = out.column_by_name("tunnel").unwrap();
        assert!(tunnel.iter().all(|v| *v == "No"));
        assert_eq!(fragment.forced["tunnel"], 1);
        // Every normalization counter is keyed by logical field name.
        assert!(!fragment.normalization.contains_key("tunnel"));
        assert!(fragment.normalization.keys().all(|k| config().field(k).is_some()));

        // Prerequisite is No on row 1 and missing on row 2.
        let standing: Vec<&str> = out.column_by_name("standing").unwrap();
        assert_eq!(standing, vec!["Yes", "No", "No", "No"]);
        assert_eq!(fragment.normalization["StandingWater"].defaulted, 2);
    }

    #[test]
    fn test_input_table_untouched() {
        let input = table();
        let before = input.clone();
        let (out, fragment) = CategoricalNormalizer::new().normalize(&input, &config());
        assert_eq!(input, before);
        assert_ne!(out, before);
        assert_eq!(fragment.rows_normalized, 4);
    }

    #[test]
    fn test_missing_column_is_warning() {
        let config = config().with_field("Night", FieldSpec::binary("night"));
        let (_, fragment) = CategoricalNormalizer::new().normalize(&table(), &config);
        assert!(fragment.warnings.contains(&Warning::MissingColumn {
            stage: Stage::Normalize,
            column: "night".to_string(),
        }));
    }
}
