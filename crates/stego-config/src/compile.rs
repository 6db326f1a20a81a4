//! Compiled-output structure.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

const fn default_inject_heading() -> bool {
    true
}

fn default_page_break() -> String {
    "none".to_string()
}

fn default_output_dir() -> String {
    "dist".to_string()
}

/// One `[[compile.levels]]` entry, outermost first.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct GroupingLevelDecl {
    /// Header field carrying the group value, e.g. `chapter`.
    #[serde(default)]
    pub key: String,

    /// Display label, e.g. `Chapter`.
    #[serde(default)]
    pub label: String,

    /// Header field carrying the group title, e.g. `chapter_title`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_key: Option<String>,

    #[serde(default = "default_inject_heading")]
    pub inject_heading: bool,

    /// Supports `{label}`, `{value}`, and `{title}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading_template: Option<String>,

    /// `none` or `between-groups`.
    #[serde(default = "default_page_break")]
    pub page_break: String,
}

impl Default for GroupingLevelDecl {
    fn default() -> Self {
        Self {
            key: String::new(),
            label: String::new(),
            title_key: None,
            inject_heading: default_inject_heading(),
            heading_template: None,
            page_break: default_page_break(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct CompileConfig {
    #[serde(default)]
    pub levels: Vec<GroupingLevelDecl>,

    /// Directory (relative to the project root) receiving compiled output.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            levels: Vec::new(),
            output_dir: default_output_dir(),
        }
    }
}
