//! Project identity used on the compiled title page.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

fn default_title() -> String {
    "Untitled Manuscript".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct ProjectInfo {
    /// Title heading of the compiled manuscript.
    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

impl Default for ProjectInfo {
    fn default() -> Self {
        Self {
            title: default_title(),
            subtitle: None,
            author: None,
        }
    }
}

impl ProjectInfo {
    /// File-name friendly form of the title (`The Long Road` -> `the-long-road`).
    #[must_use]
    pub fn slug(&self) -> String {
        let mut slug = String::with_capacity(self.title.len());
        let mut pending_dash = false;
        for ch in self.title.chars() {
            if ch.is_ascii_alphanumeric() {
                if pending_dash && !slug.is_empty() {
                    slug.push('-');
                }
                pending_dash = false;
                slug.push(ch.to_ascii_lowercase());
            } else {
                pending_dash = true;
            }
        }
        if slug.is_empty() {
            "manuscript".to_string()
        } else {
            slug
        }
    }
}
