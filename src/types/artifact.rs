// ABOUTME: The two buildable artifacts of the deployment.
// ABOUTME: Backend is always processed before frontend.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Backend,
    Frontend,
}

impl ArtifactKind {
    /// Build and push order.
    pub const ORDER: [ArtifactKind; 2] = [ArtifactKind::Backend, ArtifactKind::Frontend];

    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Backend => "backend",
            ArtifactKind::Frontend => "frontend",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
