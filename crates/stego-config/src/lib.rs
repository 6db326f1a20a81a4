//! # stego-config
//!
//! Layered project configuration loading for Stego using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`STEGO_*` prefix, `__` as separator)
//! 2. Project-level `stego-project.toml`
//! 3. User-level `~/.config/stego/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `STEGO_EXPORT__PANDOC` -> `export.pandoc`,
//! `STEGO_PROJECT__TITLE` -> `project.title`, etc.
//!
//! Category and grouping declarations are loaded unvalidated; the resolvers
//! in `stego-schema` report on them so one bad declaration never prevents
//! the rest of the project from loading.
//!
//! # Usage
//!
//! ```no_run
//! use std::path::Path;
//! use stego_config::ProjectConfig;
//!
//! let config = ProjectConfig::load(Path::new("my-novel")).expect("config");
//! println!("compiling {}", config.project.title);
//! ```

mod catalog;
mod compile;
mod error;
mod export;
mod manuscript;
mod project;
mod stage;

pub use catalog::CategoryDecl;
pub use compile::{CompileConfig, GroupingLevelDecl};
pub use error::ConfigError;
pub use export::ExportConfig;
pub use manuscript::ManuscriptConfig;
pub use project::ProjectInfo;
pub use stage::StageConfig;

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// File name marking a project root.
pub const PROJECT_FILE: &str = "stego-project.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
pub struct ProjectConfig {
    #[serde(default)]
    pub project: ProjectInfo,
    #[serde(default)]
    pub manuscript: ManuscriptConfig,
    #[serde(default)]
    pub categories: Vec<CategoryDecl>,
    #[serde(default)]
    pub compile: CompileConfig,
    #[serde(default)]
    pub stage: StageConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

impl ProjectConfig {
    /// Load configuration for the project rooted at `root`.
    ///
    /// Fails when `root` has no `stego-project.toml`.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let project_file = root.join(PROJECT_FILE);
        if !project_file.is_file() {
            return Err(ConfigError::MissingProjectFile {
                path: project_file.display().to_string(),
            });
        }
        Self::figment(root).extract().map_err(ConfigError::from)
    }

    /// Build the figment provider chain.
    ///
    /// This is public so tests can inspect the figment directly or add
    /// additional providers on top.
    pub fn figment(root: &Path) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Project file
        let project_path = root.join(PROJECT_FILE);
        if project_path.exists() {
            figment = figment.merge(Toml::file(project_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment.merge(Env::prefixed("STEGO_").split("__"))
    }

    /// JSON Schema describing `stego-project.toml`.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Self)
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("stego").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_loads() {
        let config = ProjectConfig::default();
        assert!(config.categories.is_empty());
        assert!(config.compile.levels.is_empty());
        assert_eq!(config.compile.output_dir, "dist");
        assert_eq!(config.export.pandoc, "pandoc");
    }

    #[test]
    fn figment_builds_without_files() {
        let dir = std::env::temp_dir().join("stego-config-no-project");
        let config: ProjectConfig = ProjectConfig::figment(&dir)
            .extract()
            .expect("should extract defaults");
        assert_eq!(config.project.title, "Untitled Manuscript");
        assert_eq!(config.manuscript.required_metadata, vec!["status"]);
    }

    #[test]
    fn json_schema_names_top_level_sections() {
        let schema = serde_json::to_value(ProjectConfig::json_schema()).expect("schema json");
        let properties = schema["properties"].as_object().expect("properties");
        for section in ["project", "manuscript", "categories", "compile", "stage", "export"] {
            assert!(properties.contains_key(section), "missing {section}");
        }
    }
}
