//! Manuscript documents, typed metadata, and review comment threads.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::header::{HeaderMap, HeaderValue};
use crate::issue::{IssueCategory, IssueLog};

/// Header keys that receive typed handling in [`DocumentMeta`].
pub const KNOWN_KEYS: &[&str] = &["status", "title"];

// ---------------------------------------------------------------------------
// CommentStatus
// ---------------------------------------------------------------------------

/// Resolution state of a review thread.
///
/// A thread whose metadata is missing or invalid is treated as `Open`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentStatus {
    #[default]
    Open,
    Resolved,
}

impl CommentStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Resolved => "resolved",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "open" => Some(Self::Open),
            "resolved" => Some(Self::Resolved),
            _ => None,
        }
    }
}

impl fmt::Display for CommentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Comment threads
// ---------------------------------------------------------------------------

/// Decoded `meta64` payload of a thread.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentMeta {
    pub status: CommentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paragraph_index: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentMessage {
    pub timestamp: String,
    pub author: String,
    pub text: String,
}

/// One `### CMT-NNNN` record of a comment appendix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentThread {
    pub id: String,
    pub meta: CommentMeta,
    /// At most one entry; replies use a new identifier.
    pub messages: Vec<CommentMessage>,
}

impl CommentThread {
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.meta.status == CommentStatus::Resolved
    }
}

// ---------------------------------------------------------------------------
// DocumentMeta
// ---------------------------------------------------------------------------

/// Header fields split into typed known fields and an opaque remainder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Every key outside [`KNOWN_KEYS`], in header order.
    pub other: HeaderMap,
}

impl DocumentMeta {
    /// Split a parsed header into typed fields.
    ///
    /// A known key with the wrong type is reported and dropped; unknown keys
    /// are preserved untouched.
    #[must_use]
    pub fn from_header(header: HeaderMap) -> (Self, IssueLog) {
        let mut issues = IssueLog::new();
        let mut meta = Self::default();

        for (key, value) in header.iter() {
            match key {
                "status" => match value {
                    HeaderValue::String(status) => meta.status = Some(status.clone()),
                    other => issues.error(
                        IssueCategory::Metadata,
                        format!(
                            "Metadata 'status' must be a string, found {}",
                            other.type_name()
                        ),
                    ),
                },
                "title" => match value.scalar_text() {
                    Some(title) => meta.title = Some(title),
                    None => issues.error(
                        IssueCategory::Metadata,
                        "Metadata 'title' must be a scalar value, found list",
                    ),
                },
                _ => {
                    meta.other.insert(key, value.clone());
                }
            }
        }

        (meta, issues)
    }

    /// Look up any header key, typed or opaque.
    #[must_use]
    pub fn has_key(&self, key: &str) -> bool {
        match key {
            "status" => self.status.is_some(),
            "title" => self.title.is_some(),
            _ => self.other.contains_key(key),
        }
    }

    #[must_use]
    pub fn field(&self, key: &str) -> Option<&HeaderValue> {
        self.other.get(key)
    }
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// One parsed manuscript file.
///
/// Built fresh on every inspection and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    /// Project-relative path with `/` separators.
    pub path: String,
    pub title: String,
    pub order: Option<u32>,
    pub meta: DocumentMeta,
    /// Prose with the header and comment appendix removed.
    #[serde(skip)]
    pub body: String,
    pub comments: Vec<CommentThread>,
    pub references: Vec<String>,
    pub word_count: usize,
}

impl Document {
    #[must_use]
    pub fn unresolved_comments(&self) -> usize {
        self.comments
            .iter()
            .filter(|thread| !thread.is_resolved())
            .count()
    }
}
