//! Evaluation of check groups over a smoothed table.

use indexmap::IndexMap;

use crate::config::EngineConfig;
use crate::error::Stage;
use crate::input::{DataTable, MISSING};
use crate::report::ReportFragment;
use crate::schema::{Binary, FieldSpec};
use crate::sequence::SceneGrouping;
use crate::smoothing::SmoothingFlags;

use super::list::list_len;
use super::spec::{RuleSpec, check_column_name};
use super::status::StatusCode;

/// Status of every row in every check group, in column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckResults {
    groups: IndexMap<String, Vec<StatusCode>>,
}

impl CheckResults {
    /// Status of one row in one group.
    pub fn status(&self, row: usize, group: &str) -> Option<&StatusCode> {
        self.groups.get(group)?.get(row)
    }

    /// Statuses of one group, indexed by row.
    pub fn group(&self, group: &str) -> Option<&[StatusCode]> {
        self.groups.get(group).map(Vec::as_slice)
    }

    /// Group names in column order.
    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether there are no groups.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Append one `<group>_check` column per group.
    ///
    /// A check column already present, as in a re-checked output file, is
    /// overwritten in place.
    pub fn append_to(&self, table: &mut DataTable) {
        for (group, statuses) in &self.groups {
            let name = check_column_name(group);
            match table.column_index(&name) {
                Some(col) => {
                    for (row, status) in statuses.iter().enumerate() {
                        table.set(row, col, status.as_str());
                    }
                }
                None => {
                    let values = statuses.iter().map(|s| s.as_str().to_string()).collect();
                    table.push_column(name, values);
                }
            }
        }
    }
}

/// Engine that applies the configured rule set to a table.
///
/// Rules read logical fields through the configuration's bindings. The
/// table is never modified; results are returned as [`CheckResults`].
pub struct ConsistencyRuleEngine<'a> {
    config: &'a EngineConfig,
}

impl<'a> ConsistencyRuleEngine<'a> {
    /// Create an engine over a validated configuration.
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    /// Evaluate every check group, then one `<field>_smoothing` group per
    /// smoothed field.
    pub fn evaluate(
        &self,
        table: &DataTable,
        grouping: &SceneGrouping,
        flags: &SmoothingFlags,
    ) -> (CheckResults, ReportFragment) {
        let rows = table.row_count();
        let mut fragment = ReportFragment::new();
        let mut results = CheckResults::default();

        for group in &self.config.rule_set.checks {
            let mut rules: Vec<&RuleSpec> = group
                .rules
                .iter()
                .filter(|r| self.config.rule_set.is_enabled(r.kind()))
                .collect();
            rules.sort_by_key(|r| r.kind());

            let mut statuses = vec![StatusCode::Ok; rows];
            for rule in rules {
                let Some(outcomes) = self.evaluate_rule(rule, table, grouping, &mut fragment) else {
                    continue;
                };
                for (status, outcome) in statuses.iter_mut().zip(outcomes) {
                    if status.is_ok() {
                        if let Some(violation) = outcome {
                            *status = violation;
                        }
                    }
                }
            }

            for status in statuses.iter().filter(|s| !s.is_ok()) {
                fragment.record_violation(&group.name, status.as_str());
            }
            results.groups.insert(group.name.clone(), statuses);
        }

        for field in &self.config.smoothing.fields {
            let name = EngineConfig::smoothing_group(field);
            let statuses: Vec<StatusCode> = (0..rows)
                .map(|row| match flags.get(field, row) {
                    Some(kind) => StatusCode::advisory(kind.reason()),
                    None => StatusCode::Ok,
                })
                .collect();
            for status in statuses.iter().filter(|s| !s.is_ok()) {
                fragment.record_violation(&name, status.as_str());
            }
            results.groups.insert(name, statuses);
        }

        tracing::info!(
            groups = results.len(),
            violations = fragment.violations.values().flat_map(|r| r.values()).sum::<usize>(),
            "Consistency checks complete"
        );
        (results, fragment)
    }

    /// Per-row outcome of one rule, or `None` when its columns are missing.
    fn evaluate_rule(
        &self,
        rule: &RuleSpec,
        table: &DataTable,
        grouping: &SceneGrouping,
        fragment: &mut ReportFragment,
    ) -> Option<Vec<Option<StatusCode>>> {
        let rows = table.row_count();
        let resolved = self.resolve_fields(rule, table, fragment)?;

        let outcomes = match rule {
            RuleSpec::CrossFieldExclusivity { a, b } => (0..rows)
                .map(|row| {
                    let both = resolved.get(a).binary(table, row) == Some(Binary::Yes)
                        && resolved.get(b).binary(table, row) == Some(Binary::Yes);
                    both.then(|| StatusCode::error(format!("{a} and {b} both Yes")))
                })
                .collect(),
            RuleSpec::IlluminationExclusivity { day, night } => (0..rows)
                .map(|row| {
                    let d = resolved.get(day).binary(table, row)?;
                    let n = resolved.get(night).binary(table, row)?;
                    (d == n).then(|| StatusCode::error(format!("{day}/{night} both equal")))
                })
                .collect(),
            RuleSpec::Implication {
                cause,
                effects,
                label,
            } => {
                let label = label.clone().unwrap_or_else(|| effects.join("/"));
                (0..rows)
                    .map(|row| {
                        if resolved.get(cause).binary(table, row)? != Binary::Yes {
                            return None;
                        }
                        let unsupported = effects
                            .iter()
                            .all(|e| resolved.get(e).binary(table, row) == Some(Binary::No));
                        unsupported
                            .then(|| StatusCode::error(format!("{cause} without supporting {label}")))
                    })
                    .collect()
            }
            RuleSpec::AdvisorySuspicion { effect, causes } => (0..rows)
                .map(|row| {
                    if resolved.get(effect).binary(table, row)? != Binary::Yes {
                        return None;
                    }
                    let uncaused = causes
                        .iter()
                        .all(|c| resolved.get(c).binary(table, row) == Some(Binary::No));
                    uncaused.then(|| StatusCode::advisory(format!("{effect} without cause")))
                })
                .collect(),
            RuleSpec::MagnitudeJump { field, threshold } => {
                let mut out = vec![None; rows];
                let column = resolved.get(field);
                for (_, scene) in grouping.iter() {
                    for pair in scene.windows(2) {
                        let (Some(prev), Some(cur)) =
                            (column.number(table, pair[0]), column.number(table, pair[1]))
                        else {
                            continue;
                        };
                        if (cur - prev).abs() >= *threshold {
                            out[pair[1]] = Some(StatusCode::error(format!("{field} jump")));
                        }
                    }
                }
                out
            }
            RuleSpec::ListLengthMismatch { a, b } => (0..rows)
                .map(|row| {
                    let la = list_len(resolved.get(a).cell(table, row));
                    let lb = list_len(resolved.get(b).cell(table, row));
                    match (la, lb) {
                        (Some(la), Some(lb)) if la == lb => None,
                        (Some(_), Some(_)) => {
                            Some(StatusCode::error(format!("{a}/{b} length mismatch")))
                        }
                        _ => Some(StatusCode::error(format!("{a}/{b} unparseable list"))),
                    }
                })
                .collect(),
            RuleSpec::OrderedTransition { field } => {
                let mut out = vec![None; rows];
                let spec = self.config.field(field)?;
                let column = resolved.get(field);
                for (_, scene) in grouping.iter() {
                    let states: Vec<Option<usize>> =
                        scene.iter().map(|&row| column.state(spec, table, row)).collect();
                    for (t, skipped) in skipped_transitions(&states) {
                        let names: Vec<&str> =
                            skipped.iter().map(|&i| spec.states[i].as_str()).collect();
                        out[scene[t]] = Some(StatusCode::error(format!(
                            "{field} transition skips {}",
                            names.join("/")
                        )));
                    }
                }
                out
            }
            RuleSpec::OrdinalExclusivity { field } => (0..rows)
                .map(|row| {
                    let active = resolved.get(field).yes_count(table, row);
                    (active > 1).then(|| StatusCode::error(format!("multiple {field} states")))
                })
                .collect(),
        };

        Some(outcomes)
    }

    /// Resolve every field of a rule to columns, warning on the first missing one.
    fn resolve_fields(
        &self,
        rule: &RuleSpec,
        table: &DataTable,
        fragment: &mut ReportFragment,
    ) -> Option<Resolved> {
        let mut resolved = Vec::new();
        for field in rule.fields() {
            let spec = self.config.field(field)?;
            let mut indices = Vec::new();
            for column in spec.bound_columns() {
                match table.column_index(column) {
                    Some(index) => indices.push(index),
                    None => {
                        fragment.warn_missing_column(Stage::Rules, column);
                        return None;
                    }
                }
            }
            let field_cols = match (spec.is_one_hot(), indices.as_slice()) {
                (false, [index]) => ResolvedField::Single(*index),
                (true, _) => ResolvedField::OneHot(indices),
                _ => return None,
            };
            resolved.push((field.to_string(), field_cols));
        }
        Some(Resolved(resolved))
    }
}

static UNRESOLVED: ResolvedField = ResolvedField::Empty;

/// Fields of one rule resolved against the table.
struct Resolved(Vec<(String, ResolvedField)>);

impl Resolved {
    fn get(&self, field: &str) -> &ResolvedField {
        self.0
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, r)| r)
            .unwrap_or(&UNRESOLVED)
    }
}

/// Column positions of one logical field.
enum ResolvedField {
    Single(usize),
    OneHot(Vec<usize>),
    Empty,
}

impl ResolvedField {
    fn cell<'t>(&self, table: &'t DataTable, row: usize) -> &'t str {
        match self {
            ResolvedField::Single(col) => table.get(row, *col).unwrap_or(MISSING),
            _ => MISSING,
        }
    }

    fn binary(&self, table: &DataTable, row: usize) -> Option<Binary> {
        Binary::from_cell(self.cell(table, row))
    }

    fn number(&self, table: &DataTable, row: usize) -> Option<f64> {
        self.cell(table, row).trim().parse::<f64>().ok()
    }

    fn yes_count(&self, table: &DataTable, row: usize) -> usize {
        match self {
            ResolvedField::OneHot(cols) => cols
                .iter()
                .filter(|&&col| table.get(row, col).and_then(Binary::from_cell) == Some(Binary::Yes))
                .count(),
            _ => 0,
        }
    }

    /// Ordinal rank on a row. One-hot rows need exactly one active state.
    fn state(&self, spec: &FieldSpec, table: &DataTable, row: usize) -> Option<usize> {
        match self {
            ResolvedField::Single(_) => spec.state_rank(self.cell(table, row).trim()),
            ResolvedField::OneHot(cols) => {
                let mut active = cols.iter().enumerate().filter(|&(_, &col)| {
                    table.get(row, col).and_then(Binary::from_cell) == Some(Binary::Yes)
                });
                let (rank, _) = active.next()?;
                if active.next().is_some() {
                    return None;
                }
                Some(rank)
            }
            ResolvedField::Empty => None,
        }
    }
}

/// Positions where the state jumps over at least one adjacent state, with
/// the skipped ranks in travel order.
///
/// A one-frame detour (`a, b, a`) is exempt on both the jump out and the
/// jump back.
fn skipped_transitions(states: &[Option<usize>]) -> Vec<(usize, Vec<usize>)> {
    let mut out = Vec::new();
    for t in 1..states.len() {
        let (Some(prev), Some(cur)) = (states[t - 1], states[t]) else {
            continue;
        };
        if prev.abs_diff(cur) <= 1 {
            continue;
        }
        let jump_out = states.get(t + 1).copied().flatten() == Some(prev);
        let jump_back = t >= 2 && states[t - 2] == Some(cur);
        if jump_out || jump_back {
            continue;
        }
        let skipped: Vec<usize> = if cur > prev {
            (prev + 1..cur).collect()
        } else {
            (cur + 1..prev).rev().collect()
        };
        out.push((t, skipped));
    }
    out
}
