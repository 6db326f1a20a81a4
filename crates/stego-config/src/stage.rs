//! Stage gate policy.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

fn default_unresolved_comments_block() -> Vec<String> {
    vec!["proof".to_string(), "final".to_string()]
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct StageConfig {
    /// Stages at which an unresolved comment thread blocks the gate.
    #[serde(default = "default_unresolved_comments_block")]
    pub unresolved_comments_block: Vec<String>,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            unresolved_comments_block: default_unresolved_comments_block(),
        }
    }
}

impl StageConfig {
    #[must_use]
    pub fn blocks_unresolved_comments(&self, stage: &str) -> bool {
        self.unresolved_comments_block.iter().any(|s| s == stage)
    }
}
