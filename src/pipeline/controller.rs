// ABOUTME: Pipeline controller: runs every stage in order and reports one outcome.
// ABOUTME: The first fatal stage failure halts the run; later stages never start.

use crate::config::Config;
use crate::diagnostics::Diagnostics;
use crate::runtime::PipelineRuntime;
use crate::types::{ArtifactKind, Credential};
use std::time::Instant;

use super::stage::{PipelineReport, StageName, StageObserver, StageResult};
use super::transitions::Pipeline;
use super::StageError;

/// Build, publish and deploy `config` with `runtime`.
///
/// Never retries. Non-fatal warnings are collected in `diag` and copied into
/// the returned report.
pub async fn run_pipeline(
    config: &Config,
    runtime: &impl PipelineRuntime,
    credential: &Credential,
    diag: &mut Diagnostics,
    observer: &mut impl StageObserver,
) -> PipelineReport {
    let mut recorder = Recorder::new(observer);

    let started = recorder.start(StageName::Build(ArtifactKind::Backend));
    let result = Pipeline::new(config).build_backend(runtime).await;
    let Some(pipeline) = recorder.settle(started, result) else {
        return recorder.into_report(diag);
    };

    let started = recorder.start(StageName::Build(ArtifactKind::Frontend));
    let result = pipeline.build_frontend(runtime).await;
    let Some(pipeline) = recorder.settle(started, result) else {
        return recorder.into_report(diag);
    };

    let started = recorder.start(StageName::Publish);
    let result = pipeline.publish(runtime, credential, diag).await;
    let Some(pipeline) = recorder.settle(started, result) else {
        return recorder.into_report(diag);
    };

    let started = recorder.start(StageName::Deploy);
    let result = pipeline.deploy(runtime, diag).await;
    if let Some(deployed) = recorder.settle(started, result) {
        tracing::info!(
            "deployed {} service(s) of {}",
            deployed.topology().services().len(),
            deployed.topology().project()
        );
    }

    recorder.into_report(diag)
}

/// A stage that has started but not finished.
struct Started {
    stage: StageName,
    at: Instant,
}

struct Recorder<'o, O> {
    observer: &'o mut O,
    results: Vec<StageResult>,
}

impl<'o, O: StageObserver> Recorder<'o, O> {
    fn new(observer: &'o mut O) -> Self {
        Self {
            observer,
            results: Vec::with_capacity(StageName::ALL.len()),
        }
    }

    fn start(&mut self, stage: StageName) -> Started {
        tracing::info!("stage {} started", stage);
        self.observer.stage_started(stage);
        Started {
            stage,
            at: Instant::now(),
        }
    }

    /// Record the stage outcome, yielding the next state on success.
    fn settle<T>(&mut self, started: Started, result: Result<T, StageError>) -> Option<T> {
        let duration = started.at.elapsed();
        let (record, next) = match result {
            Ok(next) => {
                tracing::info!("stage {} succeeded", started.stage);
                (StageResult::success(started.stage, duration), Some(next))
            }
            Err(e) => {
                tracing::error!("stage {} failed: {}", started.stage, e);
                (StageResult::failure(started.stage, &e, duration), None)
            }
        };
        self.observer.stage_finished(&record);
        self.results.push(record);
        next
    }

    fn into_report(self, diag: &Diagnostics) -> PipelineReport {
        PipelineReport::new(self.results, diag.warnings().to_vec())
    }
}
