//! Scenecheck: temporal smoothing and consistency checks for per-frame
//! driving-scene annotations.
//!
//! Model-generated ODD annotations are noisy: a field flickers for a frame,
//! answers come back as `Yes (partial)` or `two-lane`, and logically
//! exclusive attributes are both marked present. Scenecheck cleans such a
//! table in a fixed pipeline:
//!
//! 1. **Normalize** raw answers into canonical values.
//! 2. **Sequence** rows into scenes ordered by frame.
//! 3. **Smooth** short spikes within each scene.
//! 4. **Check** cross-field and temporal consistency rules.
//! 5. **Report** what was corrected and what was flagged.
//!
//! The input table is never modified; the engine returns a corrected copy
//! with one `<group>_check` column per check group.
//!
//! # Example
//!
//! ```no_run
//! use scenecheck::{Engine, EngineConfig};
//!
//! let engine = Engine::new(EngineConfig::odd_defaults()).unwrap();
//! let output = engine.run_file("annotations.csv").unwrap();
//!
//! println!("Segments flipped: {}", output.report.total_flips());
//! println!("Violations: {}", output.report.total_violations());
//! ```

pub mod config;
pub mod error;
pub mod input;
pub mod normalize;
pub mod report;
pub mod rules;
pub mod schema;
pub mod sequence;
pub mod smoothing;

mod engine;

pub use config::{EngineConfig, NormalizationConfig, SmoothingConfig, Thresholds};
pub use engine::{Engine, RunOutput};
pub use error::{ConfigError, Result, SceneCheckError, Stage};
pub use input::{DataTable, Parser, SourceMetadata, write_table};
pub use normalize::CategoricalNormalizer;
pub use report::{Report, ReportAggregator, ReportFragment, Warning};
pub use rules::{CheckGroup, CheckResults, ConsistencyRuleEngine, RuleKind, RuleSet, RuleSpec, StatusCode};
pub use schema::{DomainKind, FieldSpec};
pub use sequence::{SceneGrouping, SceneSequencer};
pub use smoothing::{SmoothOutcome, TemporalSmoother};
