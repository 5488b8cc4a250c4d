// ABOUTME: Run command implementation.
// ABOUTME: Resolves the credential, takes the deploy lock and runs every stage.

use shipline::config::Config;
use shipline::diagnostics::{Diagnostics, Warning};
use shipline::error::{Error, Result};
use shipline::output::Output;
use shipline::pipeline::{DeployLock, run_pipeline};

/// Build, publish and deploy the configured project.
pub async fn run(config: Config, force_lock: bool, mut output: Output) -> Result<()> {
    output.start_timer();
    let mut diag = Diagnostics::default();

    // Missing credentials are a configuration error, raised before any stage.
    let credential = config.credential()?;

    output.progress(&format!(
        "Running pipeline for {} ({}, {})",
        config.project, config.images.backend.image, config.images.frontend.image
    ));

    output.progress("  → Acquiring deploy lock...");
    let lock = DeployLock::acquire(&config.state_dir(), &config.project, force_lock)?;

    let runtime = config.docker_cli();
    let report = run_pipeline(&config, &runtime, &credential, &mut diag, &mut output).await;

    if let Err(e) = lock.release() {
        diag.warn(Warning::lock_release(e.to_string()));
    }

    for warning in diag.warnings() {
        output.diagnostic(warning);
    }

    if let Some(failed) = report.failure() {
        return Err(Error::PipelineFailed {
            stage: failed.stage,
            reason: failed.diagnostic.clone().unwrap_or_default(),
        });
    }

    output.success("Pipeline complete!");
    Ok(())
}
