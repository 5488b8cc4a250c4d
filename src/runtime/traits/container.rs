// ABOUTME: Container listing trait for container runtimes.
// ABOUTME: Used to report the running state of a deployed compose project.

use async_trait::async_trait;
use std::collections::HashMap;

/// Label compose attaches to every container of a project.
pub const COMPOSE_PROJECT_LABEL: &str = "com.docker.compose.project";

/// Label compose attaches with the service a container belongs to.
pub const COMPOSE_SERVICE_LABEL: &str = "com.docker.compose.service";

/// Read-only container queries.
#[async_trait]
pub trait ContainerOps: Send + Sync {
    /// List containers matching the given filters.
    async fn list_containers(
        &self,
        filters: &ContainerFilters,
    ) -> Result<Vec<ContainerSummary>, ContainerError>;
}

/// Filters for listing containers.
#[derive(Debug, Clone, Default)]
pub struct ContainerFilters {
    /// Filter by label (key=value).
    pub labels: HashMap<String, String>,
    /// Include stopped containers.
    pub all: bool,
}

impl ContainerFilters {
    /// All containers (running or not) belonging to a compose project.
    pub fn for_project(project: &str) -> Self {
        let mut labels = HashMap::new();
        labels.insert(COMPOSE_PROJECT_LABEL.to_string(), project.to_string());
        Self { labels, all: true }
    }
}

/// Summary information about a container.
#[derive(Debug, Clone)]
pub struct ContainerSummary {
    pub id: String,
    pub name: String,
    pub image: String,
    pub state: String,
    pub status: String,
    pub labels: HashMap<String, String>,
}

impl ContainerSummary {
    /// Compose service this container belongs to, if labelled.
    pub fn service(&self) -> Option<&str> {
        self.labels.get(COMPOSE_SERVICE_LABEL).map(String::as_str)
    }
}

/// Errors from container operations.
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    #[error("runtime error: {0}")]
    Runtime(String),
}
