//! Engine error types.

use std::path::PathBuf;

use thiserror::Error;

/// Conditions that stop an engine operation outright.
///
/// Validation findings are reported through [`IssueLog`](stego_core::IssueLog)
/// instead.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(#[from] stego_config::ConfigError),

    #[error(transparent)]
    Core(#[from] stego_core::CoreError),

    #[error("manuscript directory not found: {}", .0.display())]
    MissingManuscriptDir(PathBuf),

    #[error("unknown stage '{stage}'; expected one of: {allowed}")]
    UnknownStage { stage: String, allowed: String },

    #[error("manuscript has {0} blocking error(s)")]
    Blocked(usize),

    #[error("export failed: {0}")]
    Export(String),
}
