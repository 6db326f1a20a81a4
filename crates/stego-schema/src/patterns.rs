use std::sync::LazyLock;

use regex::Regex;

/// Lowercase identifier used as a header field name.
pub static FIELD_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9_-]*$").expect("valid field key regex"));

/// Uppercase identifier prefix.
pub static PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][A-Z0-9-]*$").expect("valid prefix regex"));

/// Markdown file name without directories.
pub static NOTES_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*\.md$").expect("valid notes file regex"));

/// Any header key a document may carry.
pub static HEADER_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("valid header key regex"));
