//! External converter settings.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

fn default_pandoc() -> String {
    "pandoc".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct ExportConfig {
    /// Executable used for `docx`, `pdf`, and `epub` exports.
    #[serde(default = "default_pandoc")]
    pub pandoc: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            pandoc: default_pandoc(),
        }
    }
}
