// ABOUTME: Container image reference parsing and validation.
// ABOUTME: Handles formats like app, team/app:tag, registry.example.com:5000/app:tag.

use std::fmt;
use thiserror::Error;

pub const DEFAULT_TAG: &str = "latest";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseImageRefError {
    #[error("image reference cannot be empty")]
    Empty,

    #[error("invalid character in image reference: {0}")]
    InvalidChar(char),

    #[error("invalid image reference format: {0}")]
    InvalidFormat(String),

    #[error("repository name must be lowercase: {0}")]
    Uppercase(String),
}

/// Registry hosts the docker client treats as Docker Hub.
const DOCKER_HUB_HOSTS: [&str; 3] = ["docker.io/", "index.docker.io/", "registry-1.docker.io/"];

/// A `(repository, tag)` pair identifying a buildable, pushable image.
///
/// The repository may carry a registry host (`registry.example.com:5000/app`).
/// The tag defaults to `latest` when omitted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageRef {
    repository: String,
    tag: String,
}

impl ImageRef {
    /// Build a reference from its parts, validating both.
    pub fn new(repository: &str, tag: Option<&str>) -> Result<Self, ParseImageRefError> {
        let repository = repository.trim();
        if repository.is_empty() {
            return Err(ParseImageRefError::Empty);
        }
        validate_chars(repository)?;

        if repository.starts_with('/') || repository.ends_with('/') || repository.contains("//") {
            return Err(ParseImageRefError::InvalidFormat(repository.to_string()));
        }

        // A colon is only valid as a registry port in the first component.
        if let Some(colon) = repository.find(':')
            && repository.find('/').is_none_or(|slash| colon > slash)
        {
            return Err(ParseImageRefError::InvalidFormat(repository.to_string()));
        }

        // Registry hosts are case-insensitive; repository paths are not.
        let path_start = match repository.split_once('/') {
            Some((first, _)) if is_registry_host(first) => first.len() + 1,
            _ => 0,
        };
        if repository[path_start..].contains(|c: char| c.is_ascii_uppercase()) {
            return Err(ParseImageRefError::Uppercase(repository.to_string()));
        }

        let tag = match tag.map(str::trim) {
            None => DEFAULT_TAG.to_string(),
            Some("") => return Err(ParseImageRefError::InvalidFormat(format!("{repository}:"))),
            Some(t) if t.contains(['/', ':']) => {
                return Err(ParseImageRefError::InvalidFormat(format!("{repository}:{t}")));
            }
            Some(t) => {
                validate_chars(t)?;
                t.to_string()
            }
        };

        Ok(Self {
            repository: repository.to_string(),
            tag,
        })
    }

    pub fn parse(input: &str) -> Result<Self, ParseImageRefError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ParseImageRefError::Empty);
        }
        validate_chars(input)?;

        // The last colon separates the tag unless it belongs to a registry port,
        // in which case a slash follows it.
        match input.rsplit_once(':') {
            Some((repository, tag)) if !tag.contains('/') => Self::new(repository, Some(tag)),
            _ => Self::new(input, None),
        }
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Registry host, if the first path component names one.
    pub fn registry(&self) -> Option<&str> {
        let (first, _) = self.repository.split_once('/')?;
        is_registry_host(first).then_some(first)
    }

    /// Whether a tag reported by the daemon (`RepoTags`) names this image.
    ///
    /// The daemon reports Docker Hub images in short form, so
    /// `docker.io/library/nginx:1` is reported as `nginx:1`.
    pub fn matches_reported(&self, reported: &str) -> bool {
        short_form(&self.to_string()) == short_form(reported)
    }

    /// Same repository with a different tag.
    pub fn with_tag(&self, tag: &str) -> Result<Self, ParseImageRefError> {
        Self::new(&self.repository, Some(tag))
    }
}

fn is_registry_host(component: &str) -> bool {
    component.contains(['.', ':']) || component == "localhost"
}

/// Strip the Docker Hub host and the `library/` namespace of official images.
fn short_form(reference: &str) -> &str {
    let Some(rest) = DOCKER_HUB_HOSTS
        .iter()
        .find_map(|host| reference.strip_prefix(host))
    else {
        return reference;
    };
    match rest.strip_prefix("library/") {
        Some(official) if !official.contains('/') => official,
        _ => rest,
    }
}

fn validate_chars(input: &str) -> Result<(), ParseImageRefError> {
    match input
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && !matches!(c, '/' | ':' | '.' | '-' | '_'))
    {
        Some(c) => Err(ParseImageRefError::InvalidChar(c)),
        None => Ok(()),
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.repository, self.tag)
    }
}

impl std::str::FromStr for ImageRef {
    type Err = ParseImageRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
