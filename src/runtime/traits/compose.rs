// ABOUTME: Compose operations trait for multi-service deployments.
// ABOUTME: Pull service images and recreate the running stack.

use super::shared_types::ComposeProject;
use async_trait::async_trait;

/// Operations on a compose project (a rendered topology file plus project name).
#[async_trait]
pub trait ComposeOps: Send + Sync {
    /// Pull the image of every service in the project.
    async fn pull(&self, project: &ComposeProject) -> Result<(), ComposeError>;

    /// Recreate containers in dependency order, detached.
    ///
    /// With `remove_orphans`, containers of services no longer declared are removed.
    async fn up(&self, project: &ComposeProject, remove_orphans: bool) -> Result<(), ComposeError>;
}

/// Errors from compose operations.
#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    #[error("pull failed: {0}")]
    PullFailed(String),

    #[error("up failed: {0}")]
    UpFailed(String),

    #[error("runtime error: {0}")]
    Runtime(String),
}
