//! Stage sequencing.
//!
//! [`Pipeline::run`] threads one [`DocumentState`] through the stages in
//! fixed order, honouring skip / stop-after / resume options and timing
//! each stage. A stage precondition failure halts the run; the report
//! then carries the partial state and the last completed stage.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use rayon::ThreadPoolBuilder;
use serde::{Deserialize, Serialize};

use crate::error::{Result, UnredactError};
use crate::model::DocumentState;
use crate::params::PipelineParams;
use crate::sources::{CandidateSource, CompositeSource};
use crate::stages::{self, Classifier, RuleClassifier};

/// Version stamped into consolidated output.
pub const PIPELINE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Segment,
    LocateRedactions,
    ProfileTypography,
    Classify,
    MatchCandidates,
    Consolidate,
}

impl Stage {
    /// All stages in execution order.
    pub const ALL: [Stage; 6] = [
        Stage::Segment,
        Stage::LocateRedactions,
        Stage::ProfileTypography,
        Stage::Classify,
        Stage::MatchCandidates,
        Stage::Consolidate,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Segment => "segment",
            Self::LocateRedactions => "locate-redactions",
            Self::ProfileTypography => "profile-typography",
            Self::Classify => "classify",
            Self::MatchCandidates => "match-candidates",
            Self::Consolidate => "consolidate",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Segment => "Cluster text spans into logical blocks",
            Self::LocateRedactions => "Detect black boxes and extract surrounding context",
            Self::ProfileTypography => "Profile document typography and measure each gap",
            Self::Classify => "Predict the semantic type of each redaction",
            Self::MatchCandidates => "Generate and width-score replacement candidates",
            Self::Consolidate => "Assemble the final per-redaction report",
        }
    }

    /// True when the state already holds this stage's output.
    pub fn output_present(self, state: &DocumentState) -> bool {
        match self {
            Self::Segment => state.blocks.is_some(),
            Self::LocateRedactions => state.redactions.is_some(),
            Self::ProfileTypography => state.typography.is_some() && state.gaps.is_some(),
            Self::Classify => state.predictions.is_some(),
            Self::MatchCandidates => state.candidates.is_some(),
            Self::Consolidate => state.output.is_some(),
        }
    }

    /// Parses a comma-separated list of stage names.
    pub fn parse_list(list: &str) -> Result<BTreeSet<Stage>> {
        list.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Stage::from_str)
            .collect()
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Stage {
    type Err = UnredactError;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_ascii_lowercase().replace('_', "-");
        let stage = match key.as_str() {
            "segment" => Self::Segment,
            "locate-redactions" | "redactions" => Self::LocateRedactions,
            "profile-typography" | "typographic" | "typography" => Self::ProfileTypography,
            "classify" => Self::Classify,
            "match-candidates" | "candidates" => Self::MatchCandidates,
            "consolidate" => Self::Consolidate,
            _ => return Err(UnredactError::UnknownStage(s.to_string())),
        };
        Ok(stage)
    }
}

/// Which stages to run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Halt after this stage has run (or been skipped).
    pub stop_after: Option<Stage>,
    /// Stages not to run.
    pub skip: BTreeSet<Stage>,
    /// Skip stages whose output is already present in the incoming state.
    pub resume: bool,
}

/// Why a run stopped early.
#[derive(Debug)]
pub struct StageHalt {
    pub stage: Stage,
    pub last_completed: Option<Stage>,
    pub error: UnredactError,
}

impl fmt::Display for StageHalt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stage `{}` failed: {}", self.stage, self.error)?;
        match self.last_completed {
            Some(last) => write!(f, " (last completed: {last})"),
            None => write!(f, " (no stage completed)"),
        }
    }
}

/// Outcome of [`Pipeline::run`].
#[derive(Debug)]
pub struct RunReport {
    pub state: DocumentState,
    pub completed: Vec<Stage>,
    pub skipped: Vec<Stage>,
    pub halted: Option<StageHalt>,
}

impl RunReport {
    pub fn is_halted(&self) -> bool {
        self.halted.is_some()
    }

    pub fn last_completed(&self) -> Option<Stage> {
        self.completed.last().copied()
    }
}

fn default_thread_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// The configured stage sequence.
pub struct Pipeline {
    params: PipelineParams,
    classifier: Box<dyn Classifier>,
    source: Box<dyn CandidateSource>,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Rule-based classifier and built-in candidate sources.
    pub fn new(params: PipelineParams) -> Result<Self> {
        params.validate()?;
        let classifier = RuleClassifier::new(params.classify.clone());
        Ok(Self {
            params,
            classifier: Box::new(classifier),
            source: Box::new(CompositeSource::with_builtin()),
        })
    }

    pub fn with_classifier(mut self, classifier: impl Classifier + 'static) -> Self {
        self.classifier = Box::new(classifier);
        self
    }

    pub fn with_source(mut self, source: impl CandidateSource + 'static) -> Self {
        self.source = Box::new(source);
        self
    }

    pub fn params(&self) -> &PipelineParams {
        &self.params
    }

    /// Runs one stage and stores its output in `state`.
    pub fn run_stage(&self, stage: Stage, state: &mut DocumentState) -> Result<()> {
        let p = &self.params;
        match stage {
            Stage::Segment => {
                state.blocks = Some(stages::segment::run(state, &p.segment));
            }
            Stage::LocateRedactions => {
                state.redactions = Some(stages::redaction::run(state, &p.locate)?);
            }
            Stage::ProfileTypography => {
                let (profile, gaps) = stages::typography::run(state, &p.typography)?;
                state.typography = Some(profile);
                state.gaps = Some(gaps);
            }
            Stage::Classify => {
                state.predictions = Some(stages::classify::run(state, self.classifier.as_ref())?);
            }
            Stage::MatchCandidates => {
                state.candidates = Some(stages::candidates::run(
                    state,
                    self.source.as_ref(),
                    &p.matching,
                    p.typography.fallback_font_size_pt,
                )?);
            }
            Stage::Consolidate => {
                state.output = Some(stages::consolidate(state, PIPELINE_VERSION));
            }
        }
        Ok(())
    }

    /// Runs every selected stage over `state`.
    ///
    /// Returns `Err` only when the worker pool cannot be built; stage
    /// failures are reported through [`RunReport::halted`].
    pub fn run(&self, state: DocumentState, options: &RunOptions) -> Result<RunReport> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.params.threads.unwrap_or_else(default_thread_count))
            .build()
            .map_err(|e| UnredactError::ThreadPool(e.to_string()))?;
        Ok(pool.install(|| self.run_in_pool(state, options)))
    }

    fn run_in_pool(&self, mut state: DocumentState, options: &RunOptions) -> RunReport {
        let run_start = Instant::now();
        let mut completed = Vec::new();
        let mut skipped = Vec::new();
        let mut halted = None;

        for stage in Stage::ALL {
            if options.skip.contains(&stage) {
                tracing::info!(stage = stage.name(), "skipped");
                skipped.push(stage);
            } else if options.resume && stage.output_present(&state) {
                tracing::info!(stage = stage.name(), "output present, resuming past");
                skipped.push(stage);
            } else {
                let span = tracing::info_span!("stage", name = stage.name());
                let _guard = span.enter();
                let start = Instant::now();
                let result = self.run_stage(stage, &mut state);
                let elapsed = start.elapsed().as_secs_f64();
                state.stage_timings.insert(stage.name().to_string(), elapsed);
                match result {
                    Ok(()) => {
                        tracing::info!(seconds = elapsed, "completed");
                        completed.push(stage);
                    }
                    Err(error) => {
                        tracing::error!(%error, "stage failed, halting pipeline");
                        halted = Some(StageHalt {
                            stage,
                            last_completed: completed.last().copied(),
                            error,
                        });
                        break;
                    }
                }
            }
            if options.stop_after == Some(stage) {
                tracing::info!(stage = stage.name(), "stopping as requested");
                break;
            }
        }

        state.stage_timings.shift_remove("total");
        state
            .stage_timings
            .insert("total".to_string(), run_start.elapsed().as_secs_f64());

        RunReport {
            state,
            completed,
            skipped,
            halted,
        }
    }
}
