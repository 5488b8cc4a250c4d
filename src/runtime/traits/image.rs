// ABOUTME: Image operations trait for container runtimes.
// ABOUTME: Build, inspect tags, and prune dangling images.

use super::shared_types::BuildRequest;
use crate::types::ImageRef;
use async_trait::async_trait;

/// Image operations: build, inspect, prune.
#[async_trait]
pub trait ImageOps: Send + Sync {
    /// Build an image from a context directory and tag it.
    async fn build_image(&self, request: &BuildRequest) -> Result<(), ImageError>;

    /// Tags (`repository:tag`) attached to a local image.
    async fn image_tags(&self, reference: &ImageRef) -> Result<Vec<String>, ImageError>;

    /// Remove dangling images from the local cache.
    async fn prune_images(&self) -> Result<(), ImageError>;
}

/// Errors from image operations.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("build failed: {0}")]
    BuildFailed(String),

    #[error("image not found: {0}")]
    NotFound(String),

    #[error("prune failed: {0}")]
    PruneFailed(String),

    #[error("runtime error: {0}")]
    Runtime(String),
}
