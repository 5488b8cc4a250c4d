// ABOUTME: Registry publisher stage: login, push images in order, always logout.
// ABOUTME: Login or push failures are fatal; logout failures become warnings.

use crate::diagnostics::{Diagnostics, Warning};
use crate::runtime::RegistryOps;
use crate::types::{Credential, ImageRef};

use super::{AuthError, LogoutError, PushError, StageError};

/// Push `images` in order inside one authenticated registry session.
///
/// Logout is attempted whether or not login and the pushes succeeded.
pub async fn publish_images(
    runtime: &impl RegistryOps,
    server: Option<&str>,
    credential: &Credential,
    images: &[&ImageRef],
    diag: &mut Diagnostics,
) -> Result<(), StageError> {
    let result = login_and_push(runtime, server, credential, images).await;

    if let Err(e) = runtime.logout(server).await {
        diag.warn(Warning::logout(LogoutError(e.to_string()).to_string()));
    }

    result
}

async fn login_and_push(
    runtime: &impl RegistryOps,
    server: Option<&str>,
    credential: &Credential,
    images: &[&ImageRef],
) -> Result<(), StageError> {
    tracing::info!("logging in to {}", server.unwrap_or("default registry"));
    runtime
        .login(server, credential)
        .await
        .map_err(|e| AuthError(e.to_string()))?;

    for image in images {
        tracing::info!("pushing {}", image);
        runtime.push_image(image).await.map_err(|e| PushError {
            image: (*image).clone(),
            reason: e.to_string(),
        })?;
    }

    Ok(())
}
