//! Error types for the scenecheck library.

use std::path::PathBuf;
use thiserror::Error;

/// Pipeline stage that raised or recorded a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Reading the input table.
    Input,
    /// Value canonicalization.
    Normalize,
    /// Grouping rows into scenes.
    Sequence,
    /// Temporal smoothing.
    Smooth,
    /// Consistency rule evaluation.
    Rules,
}

impl Stage {
    /// Get a short label for messages.
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Input => "input",
            Stage::Normalize => "normalize",
            Stage::Sequence => "sequence",
            Stage::Smooth => "smooth",
            Stage::Rules => "rules",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Reasons a configuration is rejected before any row is processed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// `n` must be positive and not larger than `m`.
    #[error("invalid smoothing thresholds for '{scope}': n={n}, m={m} (need 0 < n <= m)")]
    InvalidThresholds { scope: String, n: usize, m: usize },

    /// A rule or smoothing entry names a field that has no binding.
    #[error("field '{field}' referenced by {referenced_by} is not bound to any column")]
    UnboundField { field: String, referenced_by: String },

    /// A field is used with a rule that requires a different domain.
    #[error("field '{field}' has domain {actual} but {referenced_by} requires {expected}")]
    DomainMismatch {
        field: String,
        referenced_by: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// Two check groups share a name and would write the same column.
    #[error("check group '{0}' is declared more than once")]
    DuplicateCheckGroup(String),

    /// A field binding has no column, or an ordinal field has no states.
    #[error("field '{0}' has an empty binding")]
    EmptyField(String),
}

/// Main error type for scenecheck operations.
#[derive(Debug, Error)]
pub enum SceneCheckError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Empty file or no data to process.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// The run cannot continue; names the stage and column that caused it.
    #[error("Structural failure in {stage} stage (column '{column}'): {message}")]
    StructuralFailure {
        stage: Stage,
        column: String,
        message: String,
    },

    /// Configuration rejected at validation time.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for scenecheck operations.
pub type Result<T> = std::result::Result<T, SceneCheckError>;
