//! Declarative rule set: which rules run, on which fields, in which check group.

use serde::{Deserialize, Serialize};

/// Kind of consistency rule.
///
/// Declaration order is the evaluation priority inside a check group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    CrossFieldExclusivity,
    IlluminationExclusivity,
    Implication,
    AdvisorySuspicion,
    MagnitudeJump,
    ListLengthMismatch,
    OrderedTransition,
    OrdinalExclusivity,
}

impl RuleKind {
    /// All kinds in priority order.
    pub const ALL: [RuleKind; 8] = [
        RuleKind::CrossFieldExclusivity,
        RuleKind::IlluminationExclusivity,
        RuleKind::Implication,
        RuleKind::AdvisorySuspicion,
        RuleKind::MagnitudeJump,
        RuleKind::ListLengthMismatch,
        RuleKind::OrderedTransition,
        RuleKind::OrdinalExclusivity,
    ];

    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            RuleKind::CrossFieldExclusivity => "Cross-Field Exclusivity",
            RuleKind::IlluminationExclusivity => "Illumination Exclusivity",
            RuleKind::Implication => "Implication",
            RuleKind::AdvisorySuspicion => "Advisory Suspicion",
            RuleKind::MagnitudeJump => "Magnitude Jump",
            RuleKind::ListLengthMismatch => "List Length Mismatch",
            RuleKind::OrderedTransition => "Ordered Transition",
            RuleKind::OrdinalExclusivity => "Ordinal Exclusivity",
        }
    }

    /// Whether the rule compares a row with its scene predecessor.
    pub fn is_sequence_aware(&self) -> bool {
        matches!(self, RuleKind::MagnitudeJump | RuleKind::OrderedTransition)
    }
}

fn default_jump_threshold() -> f64 {
    2.0
}

/// One configured rule instance. Field names are logical names from the
/// field bindings, not column headers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum RuleSpec {
    /// Two binary fields must not both be `Yes`.
    CrossFieldExclusivity { a: String, b: String },
    /// Day and night must differ.
    IlluminationExclusivity { day: String, night: String },
    /// `cause == Yes` needs at least one effect at `Yes`.
    Implication {
        cause: String,
        effects: Vec<String>,
        /// Text used for the effects in the reason code; defaults to the
        /// effect names joined with `/`.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
    /// `effect == Yes` while every cause is `No` is suspicious.
    AdvisorySuspicion { effect: String, causes: Vec<String> },
    /// Adjacent numeric values within a scene differ by at least `threshold`.
    MagnitudeJump {
        field: String,
        #[serde(default = "default_jump_threshold")]
        threshold: f64,
    },
    /// Two list fields must have equal length on every row.
    ListLengthMismatch { a: String, b: String },
    /// An ordinal field must not jump over an adjacent state.
    OrderedTransition { field: String },
    /// At most one state of a one-hot ordinal field may be `Yes`.
    OrdinalExclusivity { field: String },
}

impl RuleSpec {
    /// The rule's kind.
    pub fn kind(&self) -> RuleKind {
        match self {
            RuleSpec::CrossFieldExclusivity { .. } => RuleKind::CrossFieldExclusivity,
            RuleSpec::IlluminationExclusivity { .. } => RuleKind::IlluminationExclusivity,
            RuleSpec::Implication { .. } => RuleKind::Implication,
            RuleSpec::AdvisorySuspicion { .. } => RuleKind::AdvisorySuspicion,
            RuleSpec::MagnitudeJump { .. } => RuleKind::MagnitudeJump,
            RuleSpec::ListLengthMismatch { .. } => RuleKind::ListLengthMismatch,
            RuleSpec::OrderedTransition { .. } => RuleKind::OrderedTransition,
            RuleSpec::OrdinalExclusivity { .. } => RuleKind::OrdinalExclusivity,
        }
    }

    /// Logical fields the rule reads.
    pub fn fields(&self) -> Vec<&str> {
        match self {
            RuleSpec::CrossFieldExclusivity { a, b } | RuleSpec::ListLengthMismatch { a, b } => {
                vec![a, b]
            }
            RuleSpec::IlluminationExclusivity { day, night } => vec![day, night],
            RuleSpec::Implication { cause, effects, .. } => {
                std::iter::once(cause.as_str()).chain(effects.iter().map(String::as_str)).collect()
            }
            RuleSpec::AdvisorySuspicion { effect, causes } => {
                std::iter::once(effect.as_str()).chain(causes.iter().map(String::as_str)).collect()
            }
            RuleSpec::MagnitudeJump { field, .. }
            | RuleSpec::OrderedTransition { field }
            | RuleSpec::OrdinalExclusivity { field } => vec![field],
        }
    }
}

/// Rules sharing one status column, `<name>_check`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckGroup {
    /// Group name; also the prefix of the status column.
    pub name: String,
    /// Rules in the group. Evaluated by kind priority, not by list order.
    pub rules: Vec<RuleSpec>,
}

impl CheckGroup {
    /// Create a group.
    pub fn new(name: impl Into<String>, rules: Vec<RuleSpec>) -> Self {
        Self {
            name: name.into(),
            rules,
        }
    }

    /// Name of the status column this group writes.
    pub fn column_name(&self) -> String {
        check_column_name(&self.name)
    }
}

/// Status column for a check group.
pub fn check_column_name(group: &str) -> String {
    format!("{group}_check")
}

fn all_kinds() -> Vec<RuleKind> {
    RuleKind::ALL.to_vec()
}

/// Enabled rule kinds and the check groups to evaluate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    /// Rule kinds that run; rules of other kinds are ignored.
    #[serde(default = "all_kinds")]
    pub enabled: Vec<RuleKind>,
    /// Check groups.
    #[serde(default)]
    pub checks: Vec<CheckGroup>,
}

impl RuleSet {
    /// Rule set with every kind enabled.
    pub fn new(checks: Vec<CheckGroup>) -> Self {
        Self {
            enabled: all_kinds(),
            checks,
        }
    }

    /// Whether a kind is enabled.
    pub fn is_enabled(&self, kind: RuleKind) -> bool {
        self.enabled.contains(&kind)
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
