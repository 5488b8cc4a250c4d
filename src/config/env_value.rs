// ABOUTME: Config values that may be read from the environment at run time.
// ABOUTME: Used for registry credentials injected by the CI environment.

use crate::error::{Error, Result};
use serde::Deserialize;

/// A literal string or a reference to an environment variable.
///
/// ```yaml
/// username: ci-bot
/// password: { env: REGISTRY_PASSWORD }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum EnvValue {
    Literal(String),
    FromEnv {
        #[serde(rename = "env")]
        var: String,
        #[serde(default)]
        default: Option<String>,
    },
}

impl EnvValue {
    pub fn resolve(&self) -> Result<String> {
        match self {
            EnvValue::Literal(s) => Ok(s.clone()),
            EnvValue::FromEnv { var, default } => match std::env::var(var) {
                Ok(val) => Ok(val),
                Err(_) => default
                    .clone()
                    .ok_or_else(|| Error::MissingEnvVar(var.clone())),
            },
        }
    }

    /// Where the value comes from, without revealing it.
    pub fn source(&self) -> String {
        match self {
            EnvValue::Literal(_) => "<inline>".to_string(),
            EnvValue::FromEnv { var, .. } => format!("${}", var),
        }
    }
}
