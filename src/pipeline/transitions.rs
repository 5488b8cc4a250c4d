// ABOUTME: The pipeline struct and its stage transitions.
// ABOUTME: Each transition consumes self and returns the next state on success.

use crate::config::Config;
use crate::diagnostics::Diagnostics;
use crate::runtime::{BuildRequest, ComposeOps, ImageOps, RegistryOps};
use crate::topology::ServiceTopology;
use crate::types::{ArtifactKind, Credential};

use super::builder::build_image;
use super::orchestrator::deploy_topology;
use super::publisher::publish_images;
use super::state::{ArtifactImages, BackendBuilt, Built, Deployed, Initialized, Published};
use super::StageError;

/// A pipeline run in progress, parameterized by its current state.
///
/// Stages can only be invoked in order: each state exposes exactly the
/// transition that follows it and carries what the previous stage produced.
#[derive(Debug)]
pub struct Pipeline<'a, S> {
    config: &'a Config,
    state: S,
}

impl<'a> Pipeline<'a, Initialized> {
    pub fn new(config: &'a Config) -> Self {
        Pipeline {
            config,
            state: Initialized,
        }
    }
}

impl<'a, S> Pipeline<'a, S> {
    fn transition<T>(self, state: T) -> Pipeline<'a, T> {
        Pipeline {
            config: self.config,
            state,
        }
    }

    async fn build(
        &self,
        runtime: &impl ImageOps,
        kind: ArtifactKind,
    ) -> Result<BuildRequest, StageError> {
        let request = BuildRequest {
            context: self.config.context_path(kind),
            dockerfile: self.config.dockerfile_path(kind),
            image: self.config.images.get(kind).image.clone(),
        };
        build_image(runtime, &request)
            .await
            .map_err(|e| StageError::build(kind, e))?;
        Ok(request)
    }
}

// =============================================================================
// Initialized -> BackendBuilt -> Built
// =============================================================================

impl<'a> Pipeline<'a, Initialized> {
    #[must_use = "pipeline state must be used"]
    pub async fn build_backend(
        self,
        runtime: &impl ImageOps,
    ) -> Result<Pipeline<'a, BackendBuilt>, StageError> {
        let request = self.build(runtime, ArtifactKind::Backend).await?;
        Ok(self.transition(BackendBuilt {
            backend: request.image,
        }))
    }
}

impl<'a> Pipeline<'a, BackendBuilt> {
    #[must_use = "pipeline state must be used"]
    pub async fn build_frontend(
        self,
        runtime: &impl ImageOps,
    ) -> Result<Pipeline<'a, Built>, StageError> {
        let request = self.build(runtime, ArtifactKind::Frontend).await?;
        let images = ArtifactImages {
            backend: self.state.backend.clone(),
            frontend: request.image,
        };
        Ok(self.transition(Built { images }))
    }
}

// =============================================================================
// Built -> Published
// =============================================================================

impl<'a> Pipeline<'a, Built> {
    pub fn images(&self) -> &ArtifactImages {
        &self.state.images
    }

    /// Push both images with `credential`.
    #[must_use = "pipeline state must be used"]
    pub async fn publish(
        self,
        runtime: &impl RegistryOps,
        credential: &Credential,
        diag: &mut Diagnostics,
    ) -> Result<Pipeline<'a, Published>, StageError> {
        publish_images(
            runtime,
            self.config.registry.server.as_deref(),
            credential,
            &self.state.images.ordered(),
            diag,
        )
        .await?;

        let images = self.state.images.clone();
        Ok(self.transition(Published { images }))
    }
}

// =============================================================================
// Published -> Deployed
// =============================================================================

impl<'a> Pipeline<'a, Published> {
    pub fn images(&self) -> &ArtifactImages {
        &self.state.images
    }

    /// Deploy the topology with artifact services running the published images.
    #[must_use = "pipeline state must be used"]
    pub async fn deploy(
        self,
        runtime: &(impl ComposeOps + ImageOps),
        diag: &mut Diagnostics,
    ) -> Result<Pipeline<'a, Deployed>, StageError> {
        let compose_file = self.config.compose_path();
        let topology = self
            .config
            .resolve_topology(|kind| self.state.images.get(kind).clone())
            .map_err(|e| StageError::Render {
                path: compose_file.clone(),
                reason: e.to_string(),
            })?;

        deploy_topology(runtime, &topology, &compose_file, diag).await?;
        Ok(self.transition(Deployed { topology }))
    }
}

impl Pipeline<'_, Deployed> {
    pub fn topology(&self) -> &ServiceTopology {
        &self.state.topology
    }
}
