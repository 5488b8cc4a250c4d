// ABOUTME: Composable capability traits for container runtimes.
// ABOUTME: Defines ImageOps, RegistryOps, ComposeOps and ContainerOps.

mod compose;
mod container;
mod image;
mod registry;
mod shared_types;

pub use compose::{ComposeError, ComposeOps};
pub use container::{
    COMPOSE_PROJECT_LABEL, COMPOSE_SERVICE_LABEL, ContainerError, ContainerFilters, ContainerOps,
    ContainerSummary,
};
pub use image::{ImageError, ImageOps};
pub use registry::{RegistryError, RegistryOps};
pub use shared_types::*;

/// Everything the pipeline stages need from a runtime.
///
/// Automatically implemented for any type providing all three capabilities.
pub trait PipelineRuntime: ImageOps + RegistryOps + ComposeOps {}

impl<T: ImageOps + RegistryOps + ComposeOps> PipelineRuntime for T {}
