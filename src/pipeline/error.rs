// ABOUTME: Error types for pipeline stages.
// ABOUTME: Fatal stage errors halt the run; logout and prune failures only warn.

use crate::types::{ArtifactKind, ImageRef};
use std::path::PathBuf;

/// Image build failures. All are fatal; builds are never retried.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("build context not found: {}", .0.display())]
    MissingContext(PathBuf),

    #[error("build instructions not found: {}", .0.display())]
    MissingInstructions(PathBuf),

    #[error("build of {image} failed: {reason}")]
    Failed { image: ImageRef, reason: String },

    #[error("built image is not tagged {image} (found: {})", format_tags(.found))]
    TagMismatch { image: ImageRef, found: Vec<String> },
}

fn format_tags(tags: &[String]) -> String {
    if tags.is_empty() {
        "no tags".to_string()
    } else {
        tags.join(", ")
    }
}

/// The registry rejected the login.
#[derive(Debug, thiserror::Error)]
#[error("registry login failed: {0}")]
pub struct AuthError(pub String);

/// A push failed; later pushes were skipped.
#[derive(Debug, thiserror::Error)]
#[error("push of {image} failed: {reason}")]
pub struct PushError {
    pub image: ImageRef,
    pub reason: String,
}

/// Pulling service images failed; no container was recreated.
#[derive(Debug, thiserror::Error)]
#[error("pulling service images failed: {0}")]
pub struct PullError(pub String);

/// Recreating containers failed; the stack may be partially replaced.
#[derive(Debug, thiserror::Error)]
#[error("recreating containers failed: {0}")]
pub struct RecreateError(pub String);

/// Logging out of the registry failed. Recorded as a warning.
#[derive(Debug, thiserror::Error)]
#[error("registry logout failed: {0}")]
pub struct LogoutError(pub String);

/// Pruning dangling images failed. Recorded as a warning.
#[derive(Debug, thiserror::Error)]
#[error("pruning dangling images failed: {0}")]
pub struct PruneError(pub String);

/// A fatal stage failure.
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error("{artifact}: {source}")]
    Build {
        artifact: ArtifactKind,
        #[source]
        source: BuildError,
    },

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Push(#[from] PushError),

    #[error("failed to write compose file {}: {reason}", .path.display())]
    Render { path: PathBuf, reason: String },

    #[error(transparent)]
    Pull(#[from] PullError),

    #[error(transparent)]
    Recreate(#[from] RecreateError),
}

/// Error categories for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageErrorKind {
    MissingContext,
    MissingInstructions,
    BuildFailed,
    TagMismatch,
    Auth,
    Push,
    Render,
    Pull,
    Recreate,
}

impl StageError {
    pub(crate) fn build(artifact: ArtifactKind, source: BuildError) -> Self {
        StageError::Build { artifact, source }
    }

    pub fn kind(&self) -> StageErrorKind {
        match self {
            StageError::Build { source, .. } => match source {
                BuildError::MissingContext(_) => StageErrorKind::MissingContext,
                BuildError::MissingInstructions(_) => StageErrorKind::MissingInstructions,
                BuildError::Failed { .. } => StageErrorKind::BuildFailed,
                BuildError::TagMismatch { .. } => StageErrorKind::TagMismatch,
            },
            StageError::Auth(_) => StageErrorKind::Auth,
            StageError::Push(_) => StageErrorKind::Push,
            StageError::Render { .. } => StageErrorKind::Render,
            StageError::Pull(_) => StageErrorKind::Pull,
            StageError::Recreate(_) => StageErrorKind::Recreate,
        }
    }
}
