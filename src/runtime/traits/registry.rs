// ABOUTME: Registry operations trait for container runtimes.
// ABOUTME: Login, push, and logout against a remote image registry.

use crate::types::{Credential, ImageRef};
use async_trait::async_trait;

/// Registry session operations.
///
/// `server` is the registry host; `None` means the runtime's default registry.
#[async_trait]
pub trait RegistryOps: Send + Sync {
    /// Authenticate and store the session in the runtime's credential cache.
    async fn login(&self, server: Option<&str>, credential: &Credential)
    -> Result<(), RegistryError>;

    /// Push a local image to its registry.
    async fn push_image(&self, reference: &ImageRef) -> Result<(), RegistryError>;

    /// Drop the cached session for the registry.
    async fn logout(&self, server: Option<&str>) -> Result<(), RegistryError>;
}

/// Errors from registry operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("push failed: {0}")]
    PushFailed(String),

    #[error("logout failed: {0}")]
    LogoutFailed(String),

    #[error("runtime error: {0}")]
    Runtime(String),
}
