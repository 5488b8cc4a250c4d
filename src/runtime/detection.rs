// ABOUTME: Local container runtime detection for status queries.
// ABOUTME: Honors an explicit socket, then checks Podman sockets, then Docker.

use super::types::{RuntimeConfig, RuntimeEndpoint, RuntimeType};
use std::path::Path;

const ROOTFUL_PODMAN: &str = "/run/podman/podman.sock";
const DOCKER_SOCKET: &str = "/var/run/docker.sock";

/// Error during runtime detection.
#[derive(Debug, thiserror::Error)]
pub enum DetectionError {
    #[error("no container runtime found (checked Podman and Docker sockets)")]
    NoRuntimeFound,
}

/// Detect the container runtime on this machine.
///
/// Detection order:
/// 1. Explicit `socket` from configuration
/// 2. Rootless Podman socket (`/run/user/$UID/podman/podman.sock`)
/// 3. Rootful Podman socket (`/run/podman/podman.sock`)
/// 4. Docker socket (`/var/run/docker.sock`)
pub fn detect_local(config: Option<&RuntimeConfig>) -> Result<RuntimeEndpoint, DetectionError> {
    detect_with(config, get_uid().as_deref(), |path| Path::new(path).exists())
}

/// Detection with injectable uid and socket existence check.
pub fn detect_with(
    config: Option<&RuntimeConfig>,
    uid: Option<&str>,
    socket_exists: impl Fn(&str) -> bool,
) -> Result<RuntimeEndpoint, DetectionError> {
    if let Some(cfg) = config
        && let Some(ref socket) = cfg.socket
    {
        let runtime_type = cfg.runtime.unwrap_or_else(|| guess_type(socket));
        return Ok(RuntimeEndpoint {
            runtime_type,
            socket_path: socket.clone(),
        });
    }

    let mut candidates = Vec::new();
    if let Some(uid) = uid {
        candidates.push((
            RuntimeType::Podman,
            format!("/run/user/{}/podman/podman.sock", uid),
        ));
    }
    candidates.push((RuntimeType::Podman, ROOTFUL_PODMAN.to_string()));
    candidates.push((RuntimeType::Docker, DOCKER_SOCKET.to_string()));

    // An explicit runtime type narrows the search to its sockets.
    let wanted = config.and_then(|c| c.runtime);

    candidates
        .into_iter()
        .filter(|(runtime_type, _)| wanted.is_none_or(|w| w == *runtime_type))
        .find(|(_, socket)| socket_exists(socket))
        .map(|(runtime_type, socket_path)| RuntimeEndpoint {
            runtime_type,
            socket_path,
        })
        .ok_or(DetectionError::NoRuntimeFound)
}

fn guess_type(socket: &str) -> RuntimeType {
    if socket.contains("podman") {
        RuntimeType::Podman
    } else {
        RuntimeType::Docker
    }
}

fn get_uid() -> Option<String> {
    std::env::var("UID").ok().or_else(|| {
        // Fall back to reading /proc/self/status
        std::fs::read_to_string("/proc/self/status")
            .ok()
            .and_then(|s| {
                s.lines()
                    .find(|l| l.starts_with("Uid:"))
                    .and_then(|l| l.split_whitespace().nth(1))
                    .map(str::to_string)
            })
    })
}
