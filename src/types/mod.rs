// ABOUTME: Validated domain types shared by configuration and pipeline stages.
// ABOUTME: Image references, service names, artifacts and registry credentials.

mod artifact;
mod credential;
mod image_ref;
mod service_name;

pub use artifact::ArtifactKind;
pub use credential::Credential;
pub use image_ref::{DEFAULT_TAG, ImageRef, ParseImageRefError};
pub use service_name::{MAX_SERVICE_NAME_LEN, ServiceName, ServiceNameError};
