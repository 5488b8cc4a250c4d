// ABOUTME: Names for compose services and the compose project.
// ABOUTME: Lowercase RFC 1123 labels, usable as network aliases and lock file names.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Longest name compose and DNS both accept.
pub const MAX_SERVICE_NAME_LEN: usize = 63;

#[derive(Debug, Error)]
pub enum ServiceNameError {
    #[error("name cannot be empty")]
    Empty,

    #[error("name is longer than {MAX_SERVICE_NAME_LEN} characters")]
    TooLong,

    #[error("name cannot start with '-'")]
    StartsWithHyphen,

    #[error("name cannot end with '-'")]
    EndsWithHyphen,

    #[error("name must be lowercase")]
    NotLowercase,

    #[error("name contains '{0}'; use a-z, 0-9 and '-'")]
    InvalidChar(char),
}

/// Name of a service in the deployed topology, or of the project itself.
///
/// Services reach each other by this name on the compose network.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ServiceName(String);

impl ServiceName {
    pub fn new(value: &str) -> Result<Self, ServiceNameError> {
        match value.as_bytes() {
            [] => return Err(ServiceNameError::Empty),
            bytes if bytes.len() > MAX_SERVICE_NAME_LEN => return Err(ServiceNameError::TooLong),
            [b'-', ..] => return Err(ServiceNameError::StartsWithHyphen),
            [.., b'-'] => return Err(ServiceNameError::EndsWithHyphen),
            _ => {}
        }

        if let Some(bad) = value
            .chars()
            .find(|&c| !matches!(c, 'a'..='z' | '0'..='9' | '-'))
        {
            return Err(if bad.is_ascii_uppercase() {
                ServiceNameError::NotLowercase
            } else {
                ServiceNameError::InvalidChar(bad)
            });
        }

        Ok(Self(value.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ServiceName {
    type Err = ServiceNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for ServiceName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
