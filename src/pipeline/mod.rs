// ABOUTME: Build → publish → deploy pipeline using the type state pattern.
// ABOUTME: Exports stages, state markers, the controller and the deploy lock.

mod builder;
mod controller;
mod error;
mod lock;
mod orchestrator;
mod publisher;
mod stage;
mod state;
mod transitions;

pub use builder::build_image;
pub use controller::run_pipeline;
pub use error::{
    AuthError, BuildError, LogoutError, PruneError, PullError, PushError, RecreateError,
    StageError, StageErrorKind,
};
pub use lock::{DeployLock, LockError, LockInfo, UNSETTLED_GRACE};
pub use orchestrator::deploy_topology;
pub use publisher::publish_images;
pub use stage::{Outcome, PipelineReport, StageName, StageObserver, StageResult};
pub use state::{ArtifactImages, BackendBuilt, Built, Deployed, Initialized, Published};
pub use transitions::Pipeline;
