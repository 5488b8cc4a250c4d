// ABOUTME: Application-wide error types for shipline.
// ABOUTME: Uses thiserror for ergonomic error handling.

use std::path::PathBuf;
use thiserror::Error;

use crate::pipeline::{LockError, StageName};
use crate::runtime::{ContainerError, RuntimeError};
use crate::topology::TopologyError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("file already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("configuration file not found in {0}")]
    ConfigNotFound(PathBuf),

    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid topology: {0}")]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Lock(#[from] LockError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error("failed to list containers: {0}")]
    Container(#[from] ContainerError),

    #[error("pipeline failed at {stage}: {reason}")]
    PipelineFailed { stage: StageName, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON encode error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
