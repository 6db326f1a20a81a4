//! Configuration error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Figment extraction or merge error.
    #[error("Configuration error: {0}")]
    Figment(#[from] figment::Error),

    /// The project directory has no `stego-project.toml`.
    #[error("No project file found at '{path}'")]
    MissingProjectFile { path: String },
}
