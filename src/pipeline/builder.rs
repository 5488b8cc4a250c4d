// ABOUTME: Image builder stage: builds one artifact and verifies its tag.
// ABOUTME: Checks the context and build instructions exist before invoking the runtime.

use crate::runtime::{BuildRequest, ImageError, ImageOps};
use crate::types::ImageRef;

use super::BuildError;

/// Build `request.image` and confirm the local image carries that tag.
pub async fn build_image(
    runtime: &impl ImageOps,
    request: &BuildRequest,
) -> Result<ImageRef, BuildError> {
    if !request.context.is_dir() {
        return Err(BuildError::MissingContext(request.context.clone()));
    }
    if !request.dockerfile.is_file() {
        return Err(BuildError::MissingInstructions(request.dockerfile.clone()));
    }

    tracing::info!(
        "building {} from {}",
        request.image,
        request.context.display()
    );
    runtime
        .build_image(request)
        .await
        .map_err(|e| BuildError::Failed {
            image: request.image.clone(),
            reason: e.to_string(),
        })?;

    verify_tag(runtime, &request.image).await?;
    Ok(request.image.clone())
}

async fn verify_tag(runtime: &impl ImageOps, image: &ImageRef) -> Result<(), BuildError> {
    let found = match runtime.image_tags(image).await {
        Ok(tags) => tags,
        Err(ImageError::NotFound(_)) => Vec::new(),
        Err(e) => {
            return Err(BuildError::Failed {
                image: image.clone(),
                reason: format!("inspecting built image: {}", e),
            });
        }
    };

    if found.iter().any(|tag| image.matches_reported(tag)) {
        tracing::debug!("verified tag {}", image);
        Ok(())
    } else {
        Err(BuildError::TagMismatch {
            image: image.clone(),
            found,
        })
    }
}
