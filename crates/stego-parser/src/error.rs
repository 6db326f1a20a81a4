use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HeaderError {
    /// The opening `---` on line 1 has no matching closing line.
    #[error("metadata header opened on line 1 is never closed with '---'")]
    Unterminated,
}
