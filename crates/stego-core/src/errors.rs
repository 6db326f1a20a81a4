//! Cross-cutting error types for Stego.
//!
//! Validation findings are never errors in this sense: they are collected as
//! [`Issue`](crate::Issue) values. `CoreError` is reserved for conditions that
//! stop an operation outright. Domain-specific errors (`HeaderError`,
//! `EngineError`, ...) live in their own crates.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// A file could not be read or written.
    #[error("io error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CoreError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
