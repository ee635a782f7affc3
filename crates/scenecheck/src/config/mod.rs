//! Engine configuration: thresholds, column bindings, normalization tables and
//! the rule set.
//!
//! A configuration is validated once, before any row is touched; every
//! reference to a logical field must resolve to a binding of the right
//! domain.
//!
//! ```no_run
//! use scenecheck::EngineConfig;
//!
//! let config = EngineConfig::load("odd.config.json").unwrap();
//! config.validate().unwrap();
//! ```

mod defaults;

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result, SceneCheckError};
use crate::rules::{RuleKind, RuleSet, RuleSpec};
use crate::schema::{DomainKind, FieldSpec};

/// Short-segment thresholds for the temporal smoother.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Interior segments shorter than `n` are flipped.
    pub n: usize,
    /// Segments shorter than `m` (and not flipped) are flagged for review.
    pub m: usize,
}

impl Thresholds {
    /// Create thresholds without validating them.
    pub fn new(n: usize, m: usize) -> Self {
        Self { n, m }
    }

    /// Check `0 < n <= m`.
    pub fn validate(&self, scope: &str) -> std::result::Result<(), ConfigError> {
        if self.n == 0 || self.n > self.m {
            return Err(ConfigError::InvalidThresholds {
                scope: scope.to_string(),
                n: self.n,
                m: self.m,
            });
        }
        Ok(())
    }
}

/// Which fields are smoothed, and per-field threshold overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SmoothingConfig {
    /// Logical fields to smooth, in processing order.
    #[serde(default)]
    pub fields: Vec<String>,
    /// Thresholds replacing the global ones for specific fields.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub overrides: IndexMap<String, Thresholds>,
}

/// Normalization tables that are not tied to a single field domain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizationConfig {
    /// Columns forced to `No` on every row.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub forced_no: Vec<String>,
    /// Dependent field to prerequisite field. The dependent is set to `No`
    /// wherever the prerequisite is `No` or missing.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub prerequisites: IndexMap<String, String>,
}

fn default_scene_col() -> String {
    "Scene".to_string()
}

fn default_workers() -> usize {
    1
}

/// Complete configuration for one engine run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Global flip threshold.
    pub n: usize,
    /// Global flag-without-flip threshold.
    pub m: usize,
    /// Sequencing column.
    #[serde(default = "default_scene_col")]
    pub scene_col: String,
    /// Frame order column; input row order is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_col: Option<String>,
    /// Fail instead of skipping scene-aware stages when the scene column is missing.
    #[serde(default)]
    pub require_scenes: bool,
    /// Worker threads for per-scene fan-out; 1 runs inline.
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Logical field name to column binding.
    #[serde(default)]
    pub fields: IndexMap<String, FieldSpec>,
    /// Normalization tables.
    #[serde(default)]
    pub normalization: NormalizationConfig,
    /// Smoothing selection.
    #[serde(default)]
    pub smoothing: SmoothingConfig,
    /// Consistency rules.
    #[serde(default)]
    pub rule_set: RuleSet,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            n: 3,
            m: 5,
            scene_col: default_scene_col(),
            order_col: None,
            require_scenes: false,
            workers: default_workers(),
            fields: IndexMap::new(),
            normalization: NormalizationConfig::default(),
            smoothing: SmoothingConfig::default(),
            rule_set: RuleSet::default(),
        }
    }
}

impl EngineConfig {
    /// Bind a logical field.
    pub fn with_field(mut self, name: impl Into<String>, spec: FieldSpec) -> Self {
        self.fields.insert(name.into(), spec);
        self
    }

    /// Set global thresholds.
    pub fn with_thresholds(mut self, n: usize, m: usize) -> Self {
        self.n = n;
        self.m = m;
        self
    }

    /// Look up a field binding.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.get(name)
    }

    /// Thresholds in effect for a field.
    pub fn thresholds_for(&self, field: &str) -> Thresholds {
        self.smoothing
            .overrides
            .get(field)
            .copied()
            .unwrap_or(Thresholds::new(self.n, self.m))
    }

    /// Check group name used for smoothing flags of a field.
    pub fn smoothing_group(field: &str) -> String {
        format!("{field}_smoothing")
    }

    /// Validate every reference in the configuration.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        Thresholds::new(self.n, self.m).validate("global")?;

        for (name, spec) in &self.fields {
            if !spec.is_bound() {
                return Err(ConfigError::EmptyField(name.clone()));
            }
        }

        for field in &self.smoothing.fields {
            let spec = self.require_field(field, "smoothing")?;
            let smoothable = match spec.domain {
                DomainKind::Binary | DomainKind::Numeric | DomainKind::Categorical => true,
                DomainKind::Ordinal => !spec.is_one_hot(),
                DomainKind::List => false,
            };
            if !smoothable {
                return Err(ConfigError::DomainMismatch {
                    field: field.clone(),
                    referenced_by: "smoothing".to_string(),
                    expected: "a single-column field",
                    actual: spec.domain.label(),
                });
            }
        }
        for (field, thresholds) in &self.smoothing.overrides {
            self.require_field(field, "smoothing override")?;
            thresholds.validate(field)?;
        }

        for (dependent, prerequisite) in &self.normalization.prerequisites {
            for field in [dependent, prerequisite] {
                self.require_domain(field, "prerequisite map", DomainKind::Binary)?;
            }
        }

        let mut groups = HashSet::new();
        for field in &self.smoothing.fields {
            groups.insert(Self::smoothing_group(field));
        }
        for group in &self.rule_set.checks {
            if !groups.insert(group.name.clone()) {
                return Err(ConfigError::DuplicateCheckGroup(group.name.clone()));
            }
            for rule in &group.rules {
                self.validate_rule(rule, &group.name)?;
            }
        }

        Ok(())
    }

    fn validate_rule(&self, rule: &RuleSpec, group: &str) -> std::result::Result<(), ConfigError> {
        let referenced_by = format!("{} rule in group '{}'", rule.kind().label(), group);
        let expected = match rule.kind() {
            RuleKind::MagnitudeJump => DomainKind::Numeric,
            RuleKind::ListLengthMismatch => DomainKind::List,
            RuleKind::OrderedTransition | RuleKind::OrdinalExclusivity => DomainKind::Ordinal,
            _ => DomainKind::Binary,
        };
        for field in rule.fields() {
            let spec = self.require_domain(field, &referenced_by, expected)?;
            if rule.kind() == RuleKind::OrdinalExclusivity && !spec.is_one_hot() {
                return Err(ConfigError::DomainMismatch {
                    field: field.to_string(),
                    referenced_by,
                    expected: "one-hot ordinal",
                    actual: "single-column ordinal",
                });
            }
        }
        Ok(())
    }

    fn require_field(
        &self,
        field: &str,
        referenced_by: &str,
    ) -> std::result::Result<&FieldSpec, ConfigError> {
        self.fields
            .get(field)
            .ok_or_else(|| ConfigError::UnboundField {
                field: field.to_string(),
                referenced_by: referenced_by.to_string(),
            })
    }

    fn require_domain(
        &self,
        field: &str,
        referenced_by: &str,
        expected: DomainKind,
    ) -> std::result::Result<&FieldSpec, ConfigError> {
        let spec = self.require_field(field, referenced_by)?;
        if spec.domain != expected {
            return Err(ConfigError::DomainMismatch {
                field: field.to_string(),
                referenced_by: referenced_by.to_string(),
                expected: expected.label(),
                actual: spec.domain.label(),
            });
        }
        Ok(spec)
    }

    /// Load a configuration from a JSON file. The result is not yet validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| SceneCheckError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config = serde_json::from_reader(BufReader::new(file))?;
        Ok(config)
    }

    /// Save the configuration as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| SceneCheckError::Io {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }
        let file = File::create(path).map_err(|e| SceneCheckError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }
}
