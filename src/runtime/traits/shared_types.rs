// ABOUTME: Shared types used across runtime trait definitions.
// ABOUTME: BuildRequest and ComposeProject.

use crate::types::{ImageRef, ServiceName};
use std::path::PathBuf;

/// Input for an image build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    /// Build context directory.
    pub context: PathBuf,
    /// Build instructions file.
    pub dockerfile: PathBuf,
    /// Tag applied to the result.
    pub image: ImageRef,
}

/// A compose project: rendered file plus project name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeProject {
    pub name: ServiceName,
    pub file: PathBuf,
}
