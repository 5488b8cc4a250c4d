// ABOUTME: Runtime implementation that drives the docker command-line client.
// ABOUTME: Builds, pushes and deploys by spawning docker/docker compose processes.

use crate::runtime::traits::{
    BuildRequest, ComposeError, ComposeOps, ComposeProject, ImageError, ImageOps, RegistryError,
    RegistryOps,
};
use crate::types::{Credential, ImageRef};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

pub const DEFAULT_DOCKER_BINARY: &str = "docker";

/// Error running an external command.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("{program} timed out after {}s", .limit.as_secs())]
    TimedOut { program: String, limit: Duration },

    #[error("I/O error talking to {program}: {source}")]
    Io {
        program: String,
        source: std::io::Error,
    },
}

/// Captured result of a finished command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Best single-line explanation of a failure.
    pub fn diagnostic(&self) -> String {
        let stderr = self.stderr.trim();
        let text = if stderr.is_empty() {
            self.stdout.trim()
        } else {
            stderr
        };
        match (text.lines().last(), self.exit_code) {
            (Some(line), _) => line.to_string(),
            (None, Some(code)) => format!("exited with status {}", code),
            (None, None) => "terminated by signal".to_string(),
        }
    }
}

/// Runtime backed by the `docker` CLI.
///
/// Every operation is one blocking child process; nothing runs concurrently.
#[derive(Debug, Clone)]
pub struct DockerCli {
    binary: PathBuf,
    timeout: Option<Duration>,
}

impl Default for DockerCli {
    fn default() -> Self {
        Self::new(DEFAULT_DOCKER_BINARY)
    }
}

impl DockerCli {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            timeout: None,
        }
    }

    /// Bound every spawned command by `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Run the client with `args`, optionally feeding `stdin`.
    ///
    /// Arguments are logged at debug level with the username masked; stdin never is.
    pub async fn run(
        &self,
        args: &[String],
        stdin: Option<&str>,
    ) -> Result<CommandOutput, CommandError> {
        let program = self.binary.display().to_string();
        tracing::debug!("running: {} {}", program, redacted(args));

        let mut child = Command::new(&self.binary)
            .args(args)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| CommandError::Spawn {
                program: program.clone(),
                source,
            })?;

        if let Some(input) = stdin
            && let Some(mut pipe) = child.stdin.take()
        {
            pipe.write_all(input.as_bytes())
                .await
                .map_err(|source| CommandError::Io {
                    program: program.clone(),
                    source,
                })?;
            // Closing stdin signals end of input.
            drop(pipe);
        }

        let wait = child.wait_with_output();
        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, wait)
                .await
                .map_err(|_| CommandError::TimedOut {
                    program: program.clone(),
                    limit,
                })?,
            None => wait.await,
        }
        .map_err(|source| CommandError::Io {
            program: program.clone(),
            source,
        })?;

        let result = CommandOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        tracing::debug!("{} exited with {:?}", program, result.exit_code);
        Ok(result)
    }
}

// =============================================================================
// Argument builders
// =============================================================================

pub fn build_args(request: &BuildRequest) -> Vec<String> {
    vec![
        "build".to_string(),
        "--tag".to_string(),
        request.image.to_string(),
        "--file".to_string(),
        request.dockerfile.display().to_string(),
        request.context.display().to_string(),
    ]
}

pub fn inspect_tags_args(reference: &ImageRef) -> Vec<String> {
    vec![
        "image".to_string(),
        "inspect".to_string(),
        "--format".to_string(),
        "{{json .RepoTags}}".to_string(),
        reference.to_string(),
    ]
}

pub fn prune_args() -> Vec<String> {
    vec!["image".to_string(), "prune".to_string(), "--force".to_string()]
}

/// Login arguments. The secret is passed on stdin, never as an argument.
pub fn login_args(server: Option<&str>, username: &str) -> Vec<String> {
    let mut args = vec!["login".to_string()];
    args.extend(server.map(str::to_string));
    args.extend([
        "--username".to_string(),
        username.to_string(),
        "--password-stdin".to_string(),
    ]);
    args
}

pub fn push_args(reference: &ImageRef) -> Vec<String> {
    vec!["push".to_string(), reference.to_string()]
}

pub fn logout_args(server: Option<&str>) -> Vec<String> {
    let mut args = vec!["logout".to_string()];
    args.extend(server.map(str::to_string));
    args
}

fn compose_base(project: &ComposeProject) -> Vec<String> {
    vec![
        "compose".to_string(),
        "--file".to_string(),
        project.file.display().to_string(),
        "--project-name".to_string(),
        project.name.to_string(),
    ]
}

pub fn compose_pull_args(project: &ComposeProject) -> Vec<String> {
    let mut args = compose_base(project);
    args.push("pull".to_string());
    args
}

pub fn compose_up_args(project: &ComposeProject, remove_orphans: bool) -> Vec<String> {
    let mut args = compose_base(project);
    args.extend(["up".to_string(), "--detach".to_string()]);
    if remove_orphans {
        args.push("--remove-orphans".to_string());
    }
    args
}

fn parse_repo_tags(stdout: &str) -> Result<Vec<String>, serde_json::Error> {
    // Untagged images report `null`.
    let tags: Option<Vec<String>> = serde_json::from_str(stdout.trim())?;
    Ok(tags.unwrap_or_default())
}

// =============================================================================
// Trait implementations
// =============================================================================

#[async_trait]
impl ImageOps for DockerCli {
    async fn build_image(&self, request: &BuildRequest) -> Result<(), ImageError> {
        let output = self
            .run(&build_args(request), None)
            .await
            .map_err(|e| ImageError::Runtime(e.to_string()))?;

        if !output.success() {
            return Err(ImageError::BuildFailed(format!(
                "{}: {}",
                request.image,
                output.diagnostic()
            )));
        }
        Ok(())
    }

    async fn image_tags(&self, reference: &ImageRef) -> Result<Vec<String>, ImageError> {
        let output = self
            .run(&inspect_tags_args(reference), None)
            .await
            .map_err(|e| ImageError::Runtime(e.to_string()))?;

        if !output.success() {
            return Err(ImageError::NotFound(format!(
                "{}: {}",
                reference,
                output.diagnostic()
            )));
        }

        parse_repo_tags(&output.stdout).map_err(|e| {
            ImageError::Runtime(format!("unexpected inspect output for {}: {}", reference, e))
        })
    }

    async fn prune_images(&self) -> Result<(), ImageError> {
        let output = self
            .run(&prune_args(), None)
            .await
            .map_err(|e| ImageError::Runtime(e.to_string()))?;

        if !output.success() {
            return Err(ImageError::PruneFailed(output.diagnostic()));
        }
        Ok(())
    }
}

#[async_trait]
impl RegistryOps for DockerCli {
    async fn login(
        &self,
        server: Option<&str>,
        credential: &Credential,
    ) -> Result<(), RegistryError> {
        let output = self
            .run(
                &login_args(server, credential.username()),
                Some(credential.secret()),
            )
            .await
            .map_err(|e| RegistryError::Runtime(e.to_string()))?;

        if !output.success() {
            return Err(RegistryError::AuthenticationFailed(output.diagnostic()));
        }
        Ok(())
    }

    async fn push_image(&self, reference: &ImageRef) -> Result<(), RegistryError> {
        let output = self
            .run(&push_args(reference), None)
            .await
            .map_err(|e| RegistryError::Runtime(e.to_string()))?;

        if !output.success() {
            return Err(RegistryError::PushFailed(format!(
                "{}: {}",
                reference,
                output.diagnostic()
            )));
        }
        Ok(())
    }

    async fn logout(&self, server: Option<&str>) -> Result<(), RegistryError> {
        let output = self
            .run(&logout_args(server), None)
            .await
            .map_err(|e| RegistryError::Runtime(e.to_string()))?;

        if !output.success() {
            return Err(RegistryError::LogoutFailed(output.diagnostic()));
        }
        Ok(())
    }
}

#[async_trait]
impl ComposeOps for DockerCli {
    async fn pull(&self, project: &ComposeProject) -> Result<(), ComposeError> {
        let output = self
            .run(&compose_pull_args(project), None)
            .await
            .map_err(|e| ComposeError::Runtime(e.to_string()))?;

        if !output.success() {
            return Err(ComposeError::PullFailed(output.diagnostic()));
        }
        Ok(())
    }

    async fn up(&self, project: &ComposeProject, remove_orphans: bool) -> Result<(), ComposeError> {
        let output = self
            .run(&compose_up_args(project, remove_orphans), None)
            .await
            .map_err(|e| ComposeError::Runtime(e.to_string()))?;

        if !output.success() {
            return Err(ComposeError::UpFailed(output.diagnostic()));
        }
        Ok(())
    }
}

/// Join `args` for logging, masking the value after `--username`.
fn redacted(args: &[String]) -> String {
    let mut masked = Vec::with_capacity(args.len());
    let mut mask_next = false;
    for arg in args {
        masked.push(if mask_next { "***" } else { arg.as_str() });
        mask_next = arg == "--username";
    }
    masked.join(" ")
}
