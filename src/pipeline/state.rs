// ABOUTME: Pipeline state marker types for the type state pattern.
// ABOUTME: Each state carries the typed output of the stage that produced it.

use crate::topology::ServiceTopology;
use crate::types::{ArtifactKind, ImageRef};

/// The images produced by the build stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactImages {
    pub backend: ImageRef,
    pub frontend: ImageRef,
}

impl ArtifactImages {
    pub fn get(&self, kind: ArtifactKind) -> &ImageRef {
        match kind {
            ArtifactKind::Backend => &self.backend,
            ArtifactKind::Frontend => &self.frontend,
        }
    }

    /// Images in push order.
    pub fn ordered(&self) -> [&ImageRef; 2] {
        ArtifactKind::ORDER.map(|kind| self.get(kind))
    }
}

/// Configuration loaded, nothing built.
/// Available actions: `build_backend()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Initialized;

/// Backend image built and verified.
/// Available actions: `build_frontend()`
#[derive(Debug, Clone)]
pub struct BackendBuilt {
    pub(crate) backend: ImageRef,
}

/// Both images built and verified.
/// Available actions: `publish()`
#[derive(Debug, Clone)]
pub struct Built {
    pub(crate) images: ArtifactImages,
}

/// Both images pushed to the registry.
/// Available actions: `deploy()`
#[derive(Debug, Clone)]
pub struct Published {
    pub(crate) images: ArtifactImages,
}

/// Stack recreated from the published images.
#[derive(Debug, Clone)]
pub struct Deployed {
    pub(crate) topology: ServiceTopology,
}
