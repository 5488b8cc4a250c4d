// ABOUTME: Bollard-based client for the local Docker/Podman API socket.
// ABOUTME: Answers read-only status queries about deployed containers.

use crate::runtime::traits::{ContainerError, ContainerFilters, ContainerOps, ContainerSummary};
use crate::runtime::types::{RuntimeEndpoint, RuntimeType};
use async_trait::async_trait;
use bollard::Docker;
use bollard::query_parameters::ListContainersOptions;
use std::collections::HashMap;
use std::time::Duration;

const LIST_ATTEMPTS: u32 = 3;
const LIST_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Errors reaching the runtime API.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("cannot connect: {0}")]
    Connect(String),

    #[error("request failed: {0}")]
    Request(String),
}

/// Runtime API client using bollard.
///
/// Works for both Docker and Podman through the Docker-compatible API.
pub struct BollardRuntime {
    client: Docker,
    runtime_type: RuntimeType,
}

impl BollardRuntime {
    /// Connect to the socket of a detected runtime.
    pub fn connect(endpoint: &RuntimeEndpoint) -> Result<Self, ConnectionError> {
        let client =
            Docker::connect_with_unix(&endpoint.socket_path, 120, bollard::API_DEFAULT_VERSION)
                .map_err(|e| ConnectionError::Connect(e.to_string()))?;
        Ok(Self {
            client,
            runtime_type: endpoint.runtime_type,
        })
    }

    pub fn runtime_type(&self) -> RuntimeType {
        self.runtime_type
    }

    /// Check the API answers.
    pub async fn ping(&self) -> Result<(), ConnectionError> {
        self.client
            .ping()
            .await
            .map_err(|e| ConnectionError::Connect(e.to_string()))?;
        Ok(())
    }

    /// Server version string reported by the runtime.
    pub async fn server_version(&self) -> Result<String, ConnectionError> {
        let info = self
            .client
            .info()
            .await
            .map_err(|e| ConnectionError::Request(e.to_string()))?;
        Ok(info.server_version.unwrap_or_default())
    }
}

#[async_trait]
impl ContainerOps for BollardRuntime {
    async fn list_containers(
        &self,
        filters: &ContainerFilters,
    ) -> Result<Vec<ContainerSummary>, ContainerError> {
        let mut filter_map: HashMap<String, Vec<String>> = HashMap::new();
        for (key, value) in &filters.labels {
            filter_map
                .entry("label".to_string())
                .or_default()
                .push(format!("{}={}", key, value));
        }

        let opts = ListContainersOptions {
            all: filters.all,
            filters: Some(filter_map),
            ..Default::default()
        };

        let mut attempt = 1;
        loop {
            match self.client.list_containers(Some(opts.clone())).await {
                Ok(containers) => return Ok(containers.into_iter().map(summarize).collect()),
                Err(e) if attempt < LIST_ATTEMPTS && is_transient_state(&e) => {
                    tracing::debug!("listing containers hit a transient state: {}", e);
                    attempt += 1;
                    tokio::time::sleep(LIST_RETRY_DELAY).await;
                }
                Err(e) => return Err(ContainerError::Runtime(e.to_string())),
            }
        }
    }
}

/// Podman reports `stopping`/`stopped` states that bollard cannot deserialize.
/// They pass within a moment, so listing is retried.
fn is_transient_state(error: &bollard::errors::Error) -> bool {
    let text = error.to_string();
    text.contains("unknown variant `stopping`") || text.contains("unknown variant `stopped`")
}

fn summarize(container: bollard::models::ContainerSummary) -> ContainerSummary {
    let name = container
        .names
        .into_iter()
        .flatten()
        .next()
        .map(|n| n.trim_start_matches('/').to_string())
        .unwrap_or_default();

    ContainerSummary {
        id: container.id.unwrap_or_default(),
        name,
        image: container.image.unwrap_or_default(),
        state: container
            .state
            .map(|s| format!("{:?}", s).to_lowercase())
            .unwrap_or_default(),
        status: container.status.unwrap_or_default(),
        labels: container.labels.unwrap_or_default(),
    }
}
