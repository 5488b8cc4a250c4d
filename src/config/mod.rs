// ABOUTME: Configuration types and parsing for shipline.yml.
// ABOUTME: Handles YAML parsing, env var references, path resolution and topology checks.

mod deserialize;
mod env_value;
mod init;
mod restart_policy;

pub use env_value::EnvValue;
pub use init::init_config;
pub use restart_policy::{RestartPolicy, RestartPolicyError};

use crate::error::{Error, Result};
use crate::runtime::{DEFAULT_DOCKER_BINARY, DockerCli, RuntimeConfig};
use crate::topology::{Service, ServiceTopology};
use crate::types::{ArtifactKind, Credential, ImageRef, ServiceName};
use deserialize::{deserialize_image_ref, deserialize_service_name, deserialize_services};
use nonempty::NonEmpty;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "shipline.yml";
pub const CONFIG_FILENAME_ALT: &str = "shipline.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".shipline/config.yml";

pub const DEFAULT_USERNAME_VAR: &str = "SHIPLINE_REGISTRY_USER";
pub const DEFAULT_PASSWORD_VAR: &str = "SHIPLINE_REGISTRY_PASSWORD";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(deserialize_with = "deserialize_service_name")]
    pub project: ServiceName,

    #[serde(default)]
    pub registry: RegistryConfig,

    pub images: ImagesConfig,

    #[serde(deserialize_with = "deserialize_services")]
    pub services: NonEmpty<ServiceConfig>,

    #[serde(default = "default_compose_file")]
    pub compose_file: PathBuf,

    #[serde(default)]
    pub docker: DockerConfig,

    #[serde(default)]
    pub proxy: ProxyConfig,

    /// Where the deploy lock lives. Defaults to `~/.local/state/shipline`.
    #[serde(default)]
    pub state_dir: Option<PathBuf>,

    /// Directory relative paths are resolved against.
    #[serde(skip, default = "default_base_dir")]
    pub base_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
    /// Registry host; `None` logs in to the client's default registry.
    #[serde(default)]
    pub server: Option<String>,

    #[serde(default = "default_username")]
    pub username: EnvValue,

    #[serde(default = "default_password")]
    pub password: EnvValue,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            server: None,
            username: default_username(),
            password: default_password(),
        }
    }
}

fn default_username() -> EnvValue {
    EnvValue::FromEnv {
        var: DEFAULT_USERNAME_VAR.to_string(),
        default: None,
    }
}

fn default_password() -> EnvValue {
    EnvValue::FromEnv {
        var: DEFAULT_PASSWORD_VAR.to_string(),
        default: None,
    }
}

/// The two images the pipeline builds and publishes.
#[derive(Debug, Clone, Deserialize)]
pub struct ImagesConfig {
    pub backend: ArtifactConfig,
    pub frontend: ArtifactConfig,
}

impl ImagesConfig {
    pub fn get(&self, kind: ArtifactKind) -> &ArtifactConfig {
        match kind {
            ArtifactKind::Backend => &self.backend,
            ArtifactKind::Frontend => &self.frontend,
        }
    }

    /// Artifacts in build order.
    pub fn iter(&self) -> impl Iterator<Item = (ArtifactKind, &ArtifactConfig)> {
        ArtifactKind::ORDER.into_iter().map(|kind| (kind, self.get(kind)))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactConfig {
    /// Build context directory.
    pub context: PathBuf,

    #[serde(deserialize_with = "deserialize_image_ref")]
    pub image: ImageRef,

    /// Build instructions, relative to the context.
    #[serde(default)]
    pub dockerfile: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    #[serde(deserialize_with = "deserialize_service_name")]
    pub name: ServiceName,

    #[serde(default, deserialize_with = "deserialize::deserialize_image_ref_option")]
    pub image: Option<ImageRef>,

    /// Use the image built from this artifact.
    #[serde(default)]
    pub artifact: Option<ArtifactKind>,

    #[serde(default, deserialize_with = "deserialize::deserialize_service_names")]
    pub depends_on: Vec<ServiceName>,

    #[serde(default)]
    pub ports: Vec<String>,

    #[serde(default)]
    pub volumes: Vec<String>,

    #[serde(default)]
    pub environment: BTreeMap<String, String>,

    #[serde(default)]
    pub restart: RestartPolicy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DockerConfig {
    #[serde(default = "default_docker_binary")]
    pub binary: PathBuf,

    /// Upper bound for each docker command. Unbounded when absent.
    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,

    /// API socket used by `status`.
    #[serde(flatten)]
    pub runtime: RuntimeConfig,
}

impl Default for DockerConfig {
    fn default() -> Self {
        Self {
            binary: default_docker_binary(),
            timeout: None,
            runtime: RuntimeConfig::default(),
        }
    }
}

fn default_docker_binary() -> PathBuf {
    PathBuf::from(DEFAULT_DOCKER_BINARY)
}

/// Reverse-proxy rule baked into the frontend image.
#[derive(Debug, Clone, Deserialize)]
pub struct ProxyConfig {
    #[serde(default = "default_proxy_prefix")]
    pub prefix: String,

    #[serde(default = "default_proxy_service", deserialize_with = "deserialize_service_name")]
    pub service: ServiceName,

    #[serde(default = "default_proxy_port")]
    pub port: u16,

    #[serde(default = "default_proxy_listen")]
    pub listen: u16,

    #[serde(default = "default_proxy_root")]
    pub root: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            prefix: default_proxy_prefix(),
            service: default_proxy_service(),
            port: default_proxy_port(),
            listen: default_proxy_listen(),
            root: default_proxy_root(),
        }
    }
}

fn default_proxy_prefix() -> String {
    "/api".to_string()
}

fn default_proxy_service() -> ServiceName {
    ServiceName::new("backend").expect("literal is a valid service name")
}

fn default_proxy_port() -> u16 {
    8080
}

fn default_proxy_listen() -> u16 {
    80
}

fn default_proxy_root() -> String {
    "/usr/share/nginx/html".to_string()
}

fn default_compose_file() -> PathBuf {
    PathBuf::from(".shipline/compose.yml")
}

fn default_base_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_yaml(&content)?;
        config.base_dir = match path.parent() {
            Some(dir) if dir.ends_with(".shipline") => {
                dir.parent().unwrap_or(Path::new(".")).to_path_buf()
            }
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => default_base_dir(),
        };
        Ok(config)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    /// Reject configurations whose topology or proxy rule cannot be deployed.
    fn validate(&self) -> Result<()> {
        let topology = self.topology()?;

        if !self.proxy.prefix.starts_with('/') {
            return Err(Error::InvalidConfig(format!(
                "proxy prefix must start with '/': {}",
                self.proxy.prefix
            )));
        }

        if topology.service(&self.proxy.service).is_none() {
            return Err(Error::InvalidConfig(format!(
                "proxy service '{}' is not declared in services",
                self.proxy.service
            )));
        }

        Ok(())
    }

    /// Resolve a path from the config against the config's directory.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    pub fn compose_path(&self) -> PathBuf {
        self.resolve_path(&self.compose_file)
    }

    pub fn context_path(&self, kind: ArtifactKind) -> PathBuf {
        self.resolve_path(&self.images.get(kind).context)
    }

    /// Build instructions file for an artifact (`Dockerfile` in its context by default).
    pub fn dockerfile_path(&self, kind: ArtifactKind) -> PathBuf {
        let context = self.context_path(kind);
        match self.images.get(kind).dockerfile {
            Some(ref file) if file.is_absolute() => file.clone(),
            Some(ref file) => context.join(file),
            None => context.join("Dockerfile"),
        }
    }

    /// Topology with artifact services using the configured image references.
    pub fn topology(&self) -> std::result::Result<ServiceTopology, crate::topology::TopologyError> {
        self.resolve_topology(|kind| self.images.get(kind).image.clone())
    }

    /// Topology with artifact services using images supplied by `artifact_image`.
    pub fn resolve_topology(
        &self,
        artifact_image: impl Fn(ArtifactKind) -> ImageRef,
    ) -> std::result::Result<ServiceTopology, crate::topology::TopologyError> {
        use crate::topology::TopologyError;

        let mut services = Vec::with_capacity(self.services.len());
        for svc in &self.services {
            let (image, build_context) = match (&svc.image, svc.artifact) {
                (Some(image), None) => (image.clone(), None),
                (None, Some(kind)) => (artifact_image(kind), Some(self.context_path(kind))),
                (Some(_), Some(_)) => return Err(TopologyError::AmbiguousImage(svc.name.clone())),
                (None, None) => return Err(TopologyError::MissingImage(svc.name.clone())),
            };

            services.push(Service {
                name: svc.name.clone(),
                image,
                artifact: svc.artifact,
                build_context,
                depends_on: svc.depends_on.clone(),
                ports: svc.ports.clone(),
                volumes: svc.volumes.clone(),
                environment: svc.environment.clone(),
                restart: svc.restart.clone(),
            });
        }

        let services = NonEmpty::from_vec(services).ok_or(TopologyError::Empty)?;
        ServiceTopology::new(self.project.clone(), services)
    }

    /// Resolve the registry credential from its configured sources.
    pub fn credential(&self) -> Result<Credential> {
        let username = self.registry.username.resolve()?;
        let secret = self.registry.password.resolve()?;
        if username.is_empty() {
            return Err(Error::InvalidConfig("registry username is empty".to_string()));
        }
        Ok(Credential::new(username, secret))
    }

    /// Docker CLI runtime configured for this project.
    pub fn docker_cli(&self) -> DockerCli {
        DockerCli::new(self.docker.binary.clone()).with_timeout(self.docker.timeout)
    }

    /// Directory holding the deploy lock.
    pub fn state_dir(&self) -> PathBuf {
        match self.state_dir {
            Some(ref dir) => self.resolve_path(dir),
            None => std::env::var_os("HOME")
                .map(PathBuf::from)
                .unwrap_or_else(std::env::temp_dir)
                .join(".local/state/shipline"),
        }
    }

    pub fn template() -> Self {
        Self::from_yaml(init::TEMPLATE).expect("built-in template is valid")
    }
}
