//! Validation issues and the accumulator that carries them.
//!
//! Every parser and validator returns its findings as an [`IssueLog`] next to
//! a best-effort result. Logs are merged by the orchestrating caller, so one
//! run surfaces the complete defect set.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// How an issue affects downstream build/export/gate decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Blocks any build, export, or stage gate.
    Error,
    /// Reported, never blocking.
    Warning,
}

impl Severity {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// IssueCategory
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    /// Malformed header or appendix delimiters, unreadable files.
    Structure,
    /// Invalid category, grouping, or required-field declarations.
    Schema,
    /// Invalid field type or enumerated value.
    Metadata,
    /// Missing, duplicate, or malformed filename order prefix.
    Ordering,
    /// Unknown or inline-leaked catalog identifiers.
    Continuity,
    /// Malformed comment appendix grammar.
    Comments,
    /// Stage gate policy violations.
    Stage,
}

impl IssueCategory {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Structure => "structure",
            Self::Schema => "schema",
            Self::Metadata => "metadata",
            Self::Ordering => "ordering",
            Self::Continuity => "continuity",
            Self::Comments => "comments",
            Self::Stage => "stage",
        }
    }
}

impl fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Issue
// ---------------------------------------------------------------------------

/// One validation finding.
///
/// `file` is the project-relative path when the issue belongs to a document;
/// `line` is 1-based within that file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub severity: Severity,
    pub category: IssueCategory,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl Issue {
    pub fn error(category: IssueCategory, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            category,
            message: message.into(),
            file: None,
            line: None,
        }
    }

    pub fn warning(category: IssueCategory, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            category,
            message: message.into(),
            file: None,
            line: None,
        }
    }

    #[must_use]
    pub const fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    #[must_use]
    pub fn in_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}][{}]", self.severity, self.category)?;
        match (&self.file, self.line) {
            (Some(file), Some(line)) => write!(f, " {file}:{line}")?,
            (Some(file), None) => write!(f, " {file}")?,
            (None, Some(line)) => write!(f, " line {line}")?,
            (None, None) => {}
        }
        write!(f, " {}", self.message)
    }
}

// ---------------------------------------------------------------------------
// IssueLog
// ---------------------------------------------------------------------------

/// Ordered accumulator of issues.
///
/// Passed by `&mut` inside a single orchestration scope, or returned from a
/// parser and folded in with [`IssueLog::merge`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssueLog {
    issues: Vec<Issue>,
}

impl IssueLog {
    #[must_use]
    pub const fn new() -> Self {
        Self { issues: Vec::new() }
    }

    pub fn push(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    pub fn error(&mut self, category: IssueCategory, message: impl Into<String>) {
        self.push(Issue::error(category, message));
    }

    pub fn warning(&mut self, category: IssueCategory, message: impl Into<String>) {
        self.push(Issue::warning(category, message));
    }

    pub fn error_at(&mut self, category: IssueCategory, line: usize, message: impl Into<String>) {
        self.push(Issue::error(category, message).at_line(line));
    }

    /// Append every issue of `other`, preserving order.
    pub fn merge(&mut self, other: Self) {
        self.issues.extend(other.issues);
    }

    /// Attach `file` to every issue that does not name one yet.
    #[must_use]
    pub fn in_file(mut self, file: &str) -> Self {
        for issue in &mut self.issues {
            if issue.file.is_none() {
                issue.file = Some(file.to_string());
            }
        }
        self
    }

    /// Shift every line number by `offset` (maps body-relative lines onto
    /// document lines).
    #[must_use]
    pub fn offset_lines(mut self, offset: usize) -> Self {
        for issue in &mut self.issues {
            if let Some(line) = issue.line.as_mut() {
                *line += offset;
            }
        }
        self
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(Issue::is_error)
    }

    #[must_use]
    pub fn error_count(&self) -> usize {
        self.issues.iter().filter(|issue| issue.is_error()).count()
    }

    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.issues.len() - self.error_count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Issue> {
        self.issues.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Issue] {
        &self.issues
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<Issue> {
        self.issues
    }
}

impl From<Vec<Issue>> for IssueLog {
    fn from(issues: Vec<Issue>) -> Self {
        Self { issues }
    }
}

impl Extend<Issue> for IssueLog {
    fn extend<T: IntoIterator<Item = Issue>>(&mut self, iter: T) {
        self.issues.extend(iter);
    }
}

impl IntoIterator for IssueLog {
    type Item = Issue;
    type IntoIter = std::vec::IntoIter<Issue>;

    fn into_iter(self) -> Self::IntoIter {
        self.issues.into_iter()
    }
}

impl<'a> IntoIterator for &'a IssueLog {
    type Item = &'a Issue;
    type IntoIter = std::slice::Iter<'a, Issue>;

    fn into_iter(self) -> Self::IntoIter {
        self.issues.iter()
    }
}
