// ABOUTME: Container runtime access: docker CLI for pipeline stages, bollard for status.
// ABOUTME: Stages depend only on the capability traits so they can be tested with fakes.

mod bollard;
mod detection;
mod docker_cli;
mod error;
pub mod traits;
mod types;

pub use self::bollard::{BollardRuntime, ConnectionError};
pub use detection::{DetectionError, detect_local, detect_with};
pub use docker_cli::{
    CommandError, CommandOutput, DEFAULT_DOCKER_BINARY, DockerCli, build_args, compose_pull_args,
    compose_up_args, inspect_tags_args, login_args, logout_args, prune_args, push_args,
};
pub use error::{RuntimeError, RuntimeErrorKind};
pub use traits::*;
pub use types::{RuntimeConfig, RuntimeEndpoint, RuntimeType};
