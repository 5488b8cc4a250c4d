// ABOUTME: Recording fake of the pipeline runtime traits.
// ABOUTME: Records every call in order and fails the operations a test asks it to.

use async_trait::async_trait;
use parking_lot::Mutex;
use shipline::runtime::{
    BuildRequest, ComposeError, ComposeOps, ComposeProject, ImageError, ImageOps, RegistryError,
    RegistryOps,
};
use shipline::types::{Credential, ImageRef};

/// One runtime operation, as observed by the fake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Build(String),
    InspectTags(String),
    Prune,
    Login {
        server: Option<String>,
        username: String,
    },
    Push(String),
    Logout(Option<String>),
    Pull(String),
    Up {
        project: String,
        remove_orphans: bool,
    },
}

/// An operation the fake should fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// Fail the build of images in this repository.
    Build(&'static str),
    /// Built images report a different tag.
    WrongTag,
    Login,
    /// Fail the push of images in this repository.
    Push(&'static str),
    Logout,
    Pull,
    Up,
    Prune,
}

#[derive(Default)]
pub struct FakeRuntime {
    calls: Mutex<Vec<Call>>,
    failures: Vec<Failure>,
    short_tags: bool,
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(mut self, failure: Failure) -> Self {
        self.failures.push(failure);
        self
    }

    /// Report Docker Hub tags the way the daemon does, without `docker.io/`.
    pub fn reporting_short_tags(mut self) -> Self {
        self.short_tags = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn pushes(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Push(image) => Some(image),
                _ => None,
            })
            .collect()
    }

    pub fn called(&self, predicate: impl Fn(&Call) -> bool) -> bool {
        self.calls.lock().iter().any(predicate)
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }

    fn fails(&self, failure: &Failure) -> bool {
        self.failures.contains(failure)
    }

    fn fails_for(&self, image: &ImageRef, matches: impl Fn(&Failure) -> Option<&str>) -> bool {
        self.failures
            .iter()
            .filter_map(matches)
            .any(|repo| repo == image.repository())
    }
}

#[async_trait]
impl ImageOps for FakeRuntime {
    async fn build_image(&self, request: &BuildRequest) -> Result<(), ImageError> {
        self.record(Call::Build(request.image.to_string()));
        let failed = self.fails_for(&request.image, |f| match f {
            Failure::Build(repo) => Some(*repo),
            _ => None,
        });
        if failed {
            return Err(ImageError::BuildFailed(format!(
                "{}: RUN npm ci returned 1",
                request.image
            )));
        }
        Ok(())
    }

    async fn image_tags(&self, reference: &ImageRef) -> Result<Vec<String>, ImageError> {
        self.record(Call::InspectTags(reference.to_string()));
        let built = self.called(|c| *c == Call::Build(reference.to_string()));
        if !built {
            return Err(ImageError::NotFound(reference.to_string()));
        }
        if self.fails(&Failure::WrongTag) {
            return Ok(vec![format!("{}:stale", reference.repository())]);
        }
        let tag = reference.to_string();
        match tag.strip_prefix("docker.io/") {
            Some(short) if self.short_tags => Ok(vec![short.to_string()]),
            _ => Ok(vec![tag]),
        }
    }

    async fn prune_images(&self) -> Result<(), ImageError> {
        self.record(Call::Prune);
        if self.fails(&Failure::Prune) {
            return Err(ImageError::PruneFailed("daemon busy".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl RegistryOps for FakeRuntime {
    async fn login(
        &self,
        server: Option<&str>,
        credential: &Credential,
    ) -> Result<(), RegistryError> {
        self.record(Call::Login {
            server: server.map(str::to_string),
            username: credential.username().to_string(),
        });
        if self.fails(&Failure::Login) {
            return Err(RegistryError::AuthenticationFailed(
                "unauthorized: incorrect username or password".to_string(),
            ));
        }
        Ok(())
    }

    async fn push_image(&self, reference: &ImageRef) -> Result<(), RegistryError> {
        self.record(Call::Push(reference.to_string()));
        let failed = self.fails_for(reference, |f| match f {
            Failure::Push(repo) => Some(*repo),
            _ => None,
        });
        if failed {
            return Err(RegistryError::PushFailed(format!(
                "{}: denied: requested access to the resource is denied",
                reference
            )));
        }
        Ok(())
    }

    async fn logout(&self, server: Option<&str>) -> Result<(), RegistryError> {
        self.record(Call::Logout(server.map(str::to_string)));
        if self.fails(&Failure::Logout) {
            return Err(RegistryError::LogoutFailed("not logged in".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ComposeOps for FakeRuntime {
    async fn pull(&self, project: &ComposeProject) -> Result<(), ComposeError> {
        self.record(Call::Pull(project.name.to_string()));
        if self.fails(&Failure::Pull) {
            return Err(ComposeError::PullFailed("manifest unknown".to_string()));
        }
        Ok(())
    }

    async fn up(&self, project: &ComposeProject, remove_orphans: bool) -> Result<(), ComposeError> {
        self.record(Call::Up {
            project: project.name.to_string(),
            remove_orphans,
        });
        if self.fails(&Failure::Up) {
            return Err(ComposeError::UpFailed(
                "port 80 is already allocated".to_string(),
            ));
        }
        Ok(())
    }
}
