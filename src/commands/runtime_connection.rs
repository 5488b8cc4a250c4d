// ABOUTME: Shared helper for connecting to the local container runtime API.
// ABOUTME: Detects the Docker/Podman socket and opens a bollard client.

use shipline::config::Config;
use shipline::error::Result;
use shipline::output::Output;
use shipline::runtime::{BollardRuntime, RuntimeError, detect_local};

/// Connect to the container runtime configured for the project.
///
/// This handles the common pattern of:
/// 1. Detecting the runtime type and socket path
/// 2. Outputting progress messages
/// 3. Establishing and checking the connection
pub async fn connect_to_runtime(config: &Config, output: &Output) -> Result<BollardRuntime> {
    output.progress("  → Detecting runtime...");
    let endpoint = detect_local(Some(&config.docker.runtime)).map_err(RuntimeError::from)?;

    output.progress(&format!(
        "  → Found {} at {}",
        endpoint.runtime_type, endpoint.socket_path
    ));

    let runtime = BollardRuntime::connect(&endpoint).map_err(RuntimeError::from)?;
    runtime.ping().await.map_err(RuntimeError::from)?;

    if let Ok(version) = runtime.server_version().await {
        tracing::debug!("{} server version {}", runtime.runtime_type(), version);
    }

    Ok(runtime)
}
