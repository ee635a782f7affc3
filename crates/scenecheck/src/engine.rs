//! Pipeline driver: normalize, sequence, smooth, check, report.

use std::path::Path;

use crate::config::{EngineConfig, Thresholds};
use crate::error::{Result, SceneCheckError, Stage};
use crate::input::{DataTable, Parser, ParserConfig, SourceMetadata};
use crate::normalize::CategoricalNormalizer;
use crate::report::{Report, ReportAggregator, RunInfo};
use crate::rules::{CheckResults, ConsistencyRuleEngine};
use crate::sequence::{SceneGrouping, SceneSequencer};
use crate::smoothing::{SceneCorrection, SmoothingFlags, SmoothingPlan};

/// Output of one engine run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Normalized and smoothed table with `<group>_check` columns appended.
    pub table: DataTable,
    /// Counters and warnings.
    pub report: Report,
    /// Per-row statuses, also present as check columns in `table`.
    pub checks: CheckResults,
    /// Source file metadata, for runs started from a file.
    pub source: Option<SourceMetadata>,
}

/// The scene consistency engine.
///
/// Construction validates the configuration; a constructed engine can be
/// reused for any number of tables.
pub struct Engine {
    config: EngineConfig,
    parser: Parser,
    normalizer: CategoricalNormalizer,
    sequencer: SceneSequencer,
}

impl Engine {
    /// Create an engine, rejecting an invalid configuration.
    pub fn new(config: EngineConfig) -> Result<Self> {
        Self::with_parser(config, ParserConfig::default())
    }

    /// Create an engine with a custom parser configuration.
    pub fn with_parser(config: EngineConfig, parser: ParserConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            parser: Parser::with_config(parser),
            normalizer: CategoricalNormalizer::new(),
            sequencer: SceneSequencer::new(),
        })
    }

    /// The validated configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Read a delimited file and run the pipeline on it.
    pub fn run_file(&self, path: impl AsRef<Path>) -> Result<RunOutput> {
        let (table, source) = self.parser.parse_file(path)?;
        let mut output = self.run_inner(&table, Some(source.hash.clone()))?;
        output.source = Some(source);
        Ok(output)
    }

    /// Run the pipeline on an in-memory table. The input is not modified.
    pub fn run(&self, table: &DataTable) -> Result<RunOutput> {
        self.run_inner(table, None)
    }

    fn run_inner(&self, input: &DataTable, source_hash: Option<String>) -> Result<RunOutput> {
        let config = &self.config;
        tracing::info!(rows = input.row_count(), columns = input.column_count(), "Starting run");

        let (grouping, sequence_fragment) =
            self.sequencer
                .group(input, &config.scene_col, config.order_col.as_deref());
        if config.require_scenes && !grouping.is_enabled() {
            return Err(SceneCheckError::StructuralFailure {
                stage: Stage::Sequence,
                column: config.scene_col.clone(),
                message: "scene column is required for sequence checks".to_string(),
            });
        }

        let (mut table, normalize_fragment) = self.normalizer.normalize(input, config);

        let (plan, plan_fragment) = SmoothingPlan::resolve(&table, config);
        let corrections = self.smooth_scenes(&table, &grouping, &plan);
        let mut flags = SmoothingFlags::new();
        let mut smoothing_fragments = Vec::with_capacity(corrections.len());
        for correction in corrections {
            let (scene_flags, fragment) = correction.apply(&mut table);
            flags.merge(scene_flags);
            smoothing_fragments.push(fragment);
        }
        let smoothing_fragment = ReportAggregator::aggregate(smoothing_fragments);
        tracing::info!(
            fields = plan.fields().len(),
            scenes = grouping.len(),
            flips = smoothing_fragment
                .smoothing
                .values()
                .map(|c| c.segments_flipped)
                .sum::<usize>(),
            "Smoothing complete"
        );

        let (checks, rules_fragment) =
            ConsistencyRuleEngine::new(config).evaluate(&table, &grouping, &flags);
        checks.append_to(&mut table);

        let run = RunInfo {
            rows: input.row_count(),
            scenes: grouping.len(),
            thresholds: Thresholds::new(config.n, config.m),
            source_hash,
        };
        let report = ReportAggregator::finish(
            run,
            [
                sequence_fragment,
                normalize_fragment,
                plan_fragment,
                smoothing_fragment,
                rules_fragment,
            ],
        );

        Ok(RunOutput {
            table,
            report,
            checks,
            source: None,
        })
    }

    /// Smooth every scene, fanning out over `workers` threads.
    ///
    /// Corrections come back in scene order whatever the worker count.
    fn smooth_scenes(
        &self,
        table: &DataTable,
        grouping: &SceneGrouping,
        plan: &SmoothingPlan,
    ) -> Vec<SceneCorrection> {
        if plan.is_empty() || grouping.is_empty() {
            return Vec::new();
        }

        let scenes: Vec<(&str, &[usize])> = grouping.iter().collect();
        let workers = self.config.workers.clamp(1, scenes.len());
        let smooth_one = |(id, rows): &(&str, &[usize])| {
            tracing::debug!(scene = %id, frames = rows.len(), "Smoothing scene");
            plan.smooth_scene(table, rows)
        };

        if workers == 1 {
            return scenes.iter().map(smooth_one).collect();
        }

        let chunk_size = scenes.len().div_ceil(workers);
        std::thread::scope(|scope| {
            let handles: Vec<_> = scenes
                .chunks(chunk_size)
                .map(|chunk| scope.spawn(move || chunk.iter().map(smooth_one).collect::<Vec<_>>()))
                .collect();
            handles
                .into_iter()
                .flat_map(|handle| match handle.join() {
                    Ok(corrections) => corrections,
                    Err(panic) => std::panic::resume_unwind(panic),
                })
                .collect()
        })
    }
}
