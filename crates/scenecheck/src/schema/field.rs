//! Declared field domains and their column bindings.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Domain of a logical field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainKind {
    /// `Yes` / `No`.
    Binary,
    /// Ordered states, either in one column or one-hot across state columns.
    Ordinal,
    /// Integer counts such as the number of lanes.
    Numeric,
    /// Closed enumerated set reached through a synonym map.
    Categorical,
    /// Stringified list of items.
    List,
}

impl DomainKind {
    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            DomainKind::Binary => "binary",
            DomainKind::Ordinal => "ordinal",
            DomainKind::Numeric => "numeric",
            DomainKind::Categorical => "categorical",
            DomainKind::List => "list",
        }
    }
}

/// Binding of one logical field to table columns.
///
/// Single-column fields use `column`. A one-hot ordinal field leaves
/// `column` empty and maps each state to its own binary column in `columns`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Value domain.
    pub domain: DomainKind,
    /// Column holding the value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    /// State name to column, for one-hot ordinal fields.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub columns: IndexMap<String, String>,
    /// Ordered states (ordinal) or the closed value set (categorical).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub states: Vec<String>,
    /// Raw value to canonical value.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub synonyms: IndexMap<String, String>,
}

impl FieldSpec {
    /// A field stored in a single column.
    pub fn single(domain: DomainKind, column: impl Into<String>) -> Self {
        Self {
            domain,
            column: Some(column.into()),
            columns: IndexMap::new(),
            states: Vec::new(),
            synonyms: IndexMap::new(),
        }
    }

    /// Shorthand for a binary field.
    pub fn binary(column: impl Into<String>) -> Self {
        Self::single(DomainKind::Binary, column)
    }

    /// Shorthand for a numeric field.
    pub fn numeric(column: impl Into<String>) -> Self {
        Self::single(DomainKind::Numeric, column)
    }

    /// Shorthand for a list field.
    pub fn list(column: impl Into<String>) -> Self {
        Self::single(DomainKind::List, column)
    }

    /// Categorical field over a closed set.
    pub fn categorical(column: impl Into<String>, values: &[&str]) -> Self {
        let mut spec = Self::single(DomainKind::Categorical, column);
        spec.states = values.iter().map(|s| s.to_string()).collect();
        spec
    }

    /// Ordinal field whose state name is stored in one column.
    pub fn ordinal(column: impl Into<String>, states: &[&str]) -> Self {
        let mut spec = Self::single(DomainKind::Ordinal, column);
        spec.states = states.iter().map(|s| s.to_string()).collect();
        spec
    }

    /// Ordinal field encoded as one binary column per state, in state order.
    pub fn one_hot(states: &[(&str, &str)]) -> Self {
        Self {
            domain: DomainKind::Ordinal,
            column: None,
            columns: states
                .iter()
                .map(|(s, c)| (s.to_string(), c.to_string()))
                .collect(),
            states: states.iter().map(|(s, _)| s.to_string()).collect(),
            synonyms: IndexMap::new(),
        }
    }

    /// Add a synonym mapping.
    pub fn with_synonym(mut self, raw: impl Into<String>, canonical: impl Into<String>) -> Self {
        self.synonyms.insert(raw.into(), canonical.into());
        self
    }

    /// True when the field is an ordinal spread over per-state columns.
    pub fn is_one_hot(&self) -> bool {
        self.domain == DomainKind::Ordinal && self.column.is_none() && !self.columns.is_empty()
    }

    /// Every column this field reads.
    pub fn bound_columns(&self) -> Vec<&str> {
        match &self.column {
            Some(c) => vec![c.as_str()],
            None => self.columns.values().map(|c| c.as_str()).collect(),
        }
    }

    /// Position of a state in the ordinal order.
    pub fn state_rank(&self, state: &str) -> Option<usize> {
        self.states.iter().position(|s| s == state)
    }

    /// Whether the binding names at least one column (and states, for ordinals).
    pub fn is_bound(&self) -> bool {
        let has_column = self.column.as_deref().is_some_and(|c| !c.is_empty())
            || (!self.columns.is_empty() && self.columns.values().all(|c| !c.is_empty()));
        match self.domain {
            DomainKind::Ordinal => has_column && !self.states.is_empty(),
            _ => has_column && self.columns.is_empty(),
        }
    }
}
