// ABOUTME: Service restart policy, written verbatim into the compose file.
// ABOUTME: Accepts no, always, unless-stopped and on-failure[:N].

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const ON_FAILURE: &str = "on-failure";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RestartPolicy {
    No,
    Always,
    #[default]
    UnlessStopped,
    /// Restart after a non-zero exit, at most `max_retries` times when set.
    OnFailure { max_retries: Option<u32> },
}

#[derive(Debug, thiserror::Error)]
pub enum RestartPolicyError {
    #[error("unknown restart policy '{0}' (expected no, always, unless-stopped or on-failure[:N])")]
    Unknown(String),

    #[error("on-failure retry count must be a non-negative integer, got '{0}'")]
    Retries(String),
}

impl FromStr for RestartPolicy {
    type Err = RestartPolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let policy = match s {
            "no" => RestartPolicy::No,
            "always" => RestartPolicy::Always,
            "unless-stopped" => RestartPolicy::UnlessStopped,
            ON_FAILURE => RestartPolicy::OnFailure { max_retries: None },
            other => {
                let retries = other
                    .strip_prefix(ON_FAILURE)
                    .and_then(|rest| rest.strip_prefix(':'))
                    .ok_or_else(|| RestartPolicyError::Unknown(other.to_string()))?;
                let max_retries = retries
                    .parse()
                    .map_err(|_| RestartPolicyError::Retries(retries.to_string()))?;
                RestartPolicy::OnFailure {
                    max_retries: Some(max_retries),
                }
            }
        };
        Ok(policy)
    }
}

impl fmt::Display for RestartPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestartPolicy::No => f.write_str("no"),
            RestartPolicy::Always => f.write_str("always"),
            RestartPolicy::UnlessStopped => f.write_str("unless-stopped"),
            RestartPolicy::OnFailure { max_retries } => {
                f.write_str(ON_FAILURE)?;
                match max_retries {
                    Some(n) => write!(f, ":{n}"),
                    None => Ok(()),
                }
            }
        }
    }
}

impl Serialize for RestartPolicy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RestartPolicy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_round_trips_compose_syntax() {
        for text in ["no", "always", "unless-stopped", "on-failure", "on-failure:3"] {
            let policy: RestartPolicy = text.parse().unwrap();
            assert_eq!(policy.to_string(), text);
        }
    }

    #[test]
    fn rejects_unknown_policy() {
        assert!(matches!(
            "sometimes".parse::<RestartPolicy>(),
            Err(RestartPolicyError::Unknown(_))
        ));
        assert!(matches!(
            "on-failure:many".parse::<RestartPolicy>(),
            Err(RestartPolicyError::Retries(_))
        ));
        assert!("on-failurex".parse::<RestartPolicy>().is_err());
    }
}
