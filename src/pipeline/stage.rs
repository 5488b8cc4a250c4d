// ABOUTME: Stage names, per-stage results and the report of one pipeline run.
// ABOUTME: StageObserver lets callers follow progress as stages start and finish.

use crate::diagnostics::Warning;
use crate::types::ArtifactKind;
use serde::{Serialize, Serializer};
use std::fmt;
use std::time::Duration;

use super::StageError;

/// One discrete phase of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageName {
    Build(ArtifactKind),
    Publish,
    Deploy,
}

impl StageName {
    /// Every stage, in execution order.
    pub const ALL: [StageName; 4] = [
        StageName::Build(ArtifactKind::Backend),
        StageName::Build(ArtifactKind::Frontend),
        StageName::Publish,
        StageName::Deploy,
    ];
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageName::Build(kind) => write!(f, "build:{}", kind),
            StageName::Publish => f.write_str("publish"),
            StageName::Deploy => f.write_str("deploy"),
        }
    }
}

impl Serialize for StageName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Failure,
}

/// Outcome of one stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageResult {
    pub stage: StageName,
    pub outcome: Outcome,
    /// Why the stage failed.
    pub diagnostic: Option<String>,
    pub duration: Duration,
}

impl StageResult {
    pub fn success(stage: StageName, duration: Duration) -> Self {
        Self {
            stage,
            outcome: Outcome::Success,
            diagnostic: None,
            duration,
        }
    }

    pub fn failure(stage: StageName, error: &StageError, duration: Duration) -> Self {
        Self {
            stage,
            outcome: Outcome::Failure,
            diagnostic: Some(error.to_string()),
            duration,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.outcome == Outcome::Success
    }
}

/// Everything one run produced: stage results in order plus non-fatal warnings.
#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    results: Vec<StageResult>,
    warnings: Vec<Warning>,
}

impl PipelineReport {
    pub fn new(results: Vec<StageResult>, warnings: Vec<Warning>) -> Self {
        Self { results, warnings }
    }

    pub fn results(&self) -> &[StageResult] {
        &self.results
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// True iff every stage ran and succeeded.
    pub fn succeeded(&self) -> bool {
        self.results.len() == StageName::ALL.len() && self.results.iter().all(|r| r.succeeded())
    }

    /// The stage that halted the run.
    pub fn failure(&self) -> Option<&StageResult> {
        self.results.iter().find(|r| !r.succeeded())
    }

    /// Stages that were reached, in order.
    pub fn stages(&self) -> Vec<StageName> {
        self.results.iter().map(|r| r.stage).collect()
    }
}

/// Receives stage progress during a run.
pub trait StageObserver {
    fn stage_started(&mut self, _stage: StageName) {}

    fn stage_finished(&mut self, _result: &StageResult) {}
}

/// Ignores progress.
impl StageObserver for () {}
