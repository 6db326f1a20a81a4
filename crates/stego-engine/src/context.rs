//! Explicit project context handed to every engine entry point.

use std::path::{Path, PathBuf};

use stego_config::ProjectConfig;

use crate::error::EngineError;

/// Subdirectory holding manuscript files.
pub const MANUSCRIPT_DIR: &str = "manuscript";

/// Subdirectory holding catalog notes files.
pub const SPINE_DIR: &str = "spine";

/// A project root and its resolved configuration.
#[derive(Debug, Clone)]
pub struct ProjectContext {
    pub root: PathBuf,
    pub config: ProjectConfig,
}

impl ProjectContext {
    #[must_use]
    pub const fn new(root: PathBuf, config: ProjectConfig) -> Self {
        Self { root, config }
    }

    /// Load `stego-project.toml` (plus global and env layers) for `root`.
    pub fn load(root: &Path) -> Result<Self, EngineError> {
        let config = ProjectConfig::load(root)?;
        Ok(Self::new(root.to_path_buf(), config))
    }

    #[must_use]
    pub fn manuscript_dir(&self) -> PathBuf {
        self.root.join(MANUSCRIPT_DIR)
    }

    #[must_use]
    pub fn spine_dir(&self) -> PathBuf {
        self.root.join(SPINE_DIR)
    }

    /// Default location of the compiled manuscript.
    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        self.root
            .join(&self.config.compile.output_dir)
            .join(format!("{}.md", self.config.project.slug()))
    }

    /// Project-relative display path with `/` separators.
    ///
    /// Paths outside the root are returned as given.
    #[must_use]
    pub fn relative_path(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        relative
            .components()
            .map(|component| component.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}
