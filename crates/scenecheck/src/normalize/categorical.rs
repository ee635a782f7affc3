//! Synonym consolidation for categorical and single-column ordinal fields.

use crate::schema::{FieldSpec, is_missing};

/// Outcome of consolidating one cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Consolidated {
    /// Canonical member of the value set.
    Canonical(String),
    /// Null-like cell.
    Missing,
    /// Value outside the set and the synonym map; passed through unchanged.
    Unmapped,
}

/// Map a raw value onto the field's closed set.
///
/// Exact matches win over case-insensitive ones, and members of the set win
/// over synonyms. A field without a declared set accepts any value and only
/// applies its synonyms.
pub fn consolidate(raw: &str, spec: &FieldSpec) -> Consolidated {
    if is_missing(raw) {
        return Consolidated::Missing;
    }
    let value = raw.trim();

    if let Some(state) = spec.states.iter().find(|s| *s == value) {
        return Consolidated::Canonical(state.clone());
    }
    if let Some(canonical) = spec.synonyms.get(value) {
        return Consolidated::Canonical(canonical.clone());
    }
    if let Some(state) = spec.states.iter().find(|s| s.eq_ignore_ascii_case(value)) {
        return Consolidated::Canonical(state.clone());
    }
    if let Some((_, canonical)) = spec
        .synonyms
        .iter()
        .find(|(raw, _)| raw.eq_ignore_ascii_case(value))
    {
        return Consolidated::Canonical(canonical.clone());
    }

    if spec.states.is_empty() {
        Consolidated::Canonical(value.to_string())
    } else {
        Consolidated::Unmapped
    }
}
