// ABOUTME: Deployment orchestrator stage: render, pull, recreate, prune.
// ABOUTME: A failed pull leaves running containers untouched; prune is best-effort.

use crate::diagnostics::{Diagnostics, Warning};
use crate::runtime::{ComposeOps, ComposeProject, ImageOps};
use crate::topology::{ServiceTopology, render_compose};
use std::path::Path;

use super::{PruneError, PullError, RecreateError, StageError};

/// Replace the running stack with `topology`.
///
/// No rollback is attempted if recreating fails.
pub async fn deploy_topology(
    runtime: &(impl ComposeOps + ImageOps),
    topology: &ServiceTopology,
    compose_file: &Path,
    diag: &mut Diagnostics,
) -> Result<(), StageError> {
    write_compose_file(topology, compose_file).await?;

    let project = ComposeProject {
        name: topology.project().clone(),
        file: compose_file.to_path_buf(),
    };

    tracing::info!("pulling images for {}", project.name);
    runtime
        .pull(&project)
        .await
        .map_err(|e| PullError(e.to_string()))?;

    tracing::info!("recreating containers for {}", project.name);
    runtime
        .up(&project, true)
        .await
        .map_err(|e| RecreateError(e.to_string()))?;

    if let Err(e) = runtime.prune_images().await {
        diag.warn(Warning::prune(PruneError(e.to_string()).to_string()));
    }

    Ok(())
}

async fn write_compose_file(topology: &ServiceTopology, path: &Path) -> Result<(), StageError> {
    let render_error = |reason: String| StageError::Render {
        path: path.to_path_buf(),
        reason,
    };

    let yaml = render_compose(topology).map_err(|e| render_error(e.to_string()))?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| render_error(e.to_string()))?;
    }
    tokio::fs::write(path, yaml)
        .await
        .map_err(|e| render_error(e.to_string()))?;

    tracing::debug!("wrote {}", path.display());
    Ok(())
}
