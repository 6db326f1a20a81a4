//! Per-document metadata policy.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

fn default_required_metadata() -> Vec<String> {
    vec!["status".to_string()]
}

fn default_allowed_statuses() -> Vec<String> {
    ["draft", "revise", "line-edit", "proof", "final"]
        .into_iter()
        .map(String::from)
        .collect()
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct ManuscriptConfig {
    /// Treat a file without a header block as an error.
    #[serde(default)]
    pub require_header: bool,

    /// Header keys every manuscript file must carry.
    #[serde(default = "default_required_metadata")]
    pub required_metadata: Vec<String>,

    /// Accepted `status` values, ordered from earliest to latest stage.
    #[serde(default = "default_allowed_statuses")]
    pub allowed_statuses: Vec<String>,
}

impl Default for ManuscriptConfig {
    fn default() -> Self {
        Self {
            require_header: false,
            required_metadata: default_required_metadata(),
            allowed_statuses: default_allowed_statuses(),
        }
    }
}

impl ManuscriptConfig {
    /// Position of `status` in the stage progression.
    #[must_use]
    pub fn status_rank(&self, status: &str) -> Option<usize> {
        self.allowed_statuses.iter().position(|s| s == status)
    }
}
