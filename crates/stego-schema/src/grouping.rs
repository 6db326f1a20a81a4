//! Multi-level grouping of the compiled manuscript.
//!
//! Levels are ordered outermost first (e.g. part, then chapter). Only boundary
//! documents need to carry a level's field; the assembler inherits values
//! forward through the sorted document list.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;
use stego_config::GroupingLevelDecl;
use stego_core::document::KNOWN_KEYS;
use stego_core::{DocumentMeta, HeaderValue, IssueCategory, IssueLog};

use crate::patterns::FIELD_KEY;

const PLACEHOLDERS: &[&str] = &["label", "value", "title"];

// ---------------------------------------------------------------------------
// PageBreakMode
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageBreakMode {
    #[default]
    None,
    BetweenGroups,
}

impl PageBreakMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::BetweenGroups => "between-groups",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "none" => Some(Self::None),
            "between-groups" => Some(Self::BetweenGroups),
            _ => None,
        }
    }
}

impl fmt::Display for PageBreakMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// GroupingLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupingLevel {
    pub key: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_key: Option<String>,
    pub inject_heading: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading_template: Option<String>,
    pub page_break: PageBreakMode,
}

impl GroupingLevel {
    /// The document's own value for this level, if it sets one.
    ///
    /// Lists and empty strings count as unset.
    #[must_use]
    pub fn value_of(&self, meta: &DocumentMeta) -> Option<String> {
        scalar_field(meta, &self.key)
    }

    /// The document's own group title for this level, if it sets one.
    #[must_use]
    pub fn title_of(&self, meta: &DocumentMeta) -> Option<String> {
        self.title_key
            .as_deref()
            .and_then(|key| scalar_field(meta, key))
    }

    /// Render the group heading text (without the leading `#`s).
    #[must_use]
    pub fn format_heading(&self, value: &str, title: Option<&str>) -> String {
        let Some(template) = self.heading_template.as_deref() else {
            return match title {
                Some(title) => format!("{} {value}: {title}", self.label),
                None => format!("{} {value}", self.label),
            };
        };

        let rendered = template
            .replace("{label}", &self.label)
            .replace("{value}", value)
            .replace("{title}", title.unwrap_or_default());
        if title.is_some() {
            rendered
        } else {
            rendered
                .trim_end_matches(|ch: char| ch.is_whitespace() || ch == ':' || ch == '-')
                .to_string()
        }
    }

    fn compile(decl: &GroupingLevelDecl, page_break: PageBreakMode) -> Self {
        Self {
            key: decl.key.clone(),
            label: decl.label.clone(),
            title_key: decl.title_key.clone(),
            inject_heading: decl.inject_heading,
            heading_template: decl.heading_template.clone(),
            page_break,
        }
    }
}

fn scalar_field(meta: &DocumentMeta, key: &str) -> Option<String> {
    meta.field(key)
        .and_then(HeaderValue::scalar_text)
        .filter(|text| !text.is_empty())
}

/// Names inside `{...}` that are not supported placeholders.
fn unknown_placeholders(template: &str) -> Vec<&str> {
    let mut unknown = Vec::new();
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            break;
        };
        let name = &after[..close];
        if !PLACEHOLDERS.contains(&name) {
            unknown.push(name);
        }
        rest = &after[close + 1..];
    }
    unknown
}

// ---------------------------------------------------------------------------
// GroupingSchema
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct GroupingSchema {
    pub levels: Vec<GroupingLevel>,
}

impl GroupingSchema {
    /// Validate grouping-level declarations.
    ///
    /// Any declaration error yields a schema with no levels.
    #[must_use]
    pub fn resolve(decls: &[GroupingLevelDecl]) -> (Self, IssueLog) {
        let mut issues = IssueLog::new();
        let mut keys = HashSet::new();
        let mut levels = Vec::with_capacity(decls.len());

        for (index, decl) in decls.iter().enumerate() {
            let position = index + 1;
            if !FIELD_KEY.is_match(&decl.key) {
                issues.error(
                    IssueCategory::Schema,
                    format!(
                        "Grouping level #{position} key '{}' must match ^[a-z][a-z0-9_-]*$",
                        decl.key
                    ),
                );
            } else if KNOWN_KEYS.contains(&decl.key.as_str()) {
                issues.error(
                    IssueCategory::Schema,
                    format!("Grouping level #{position} key '{}' is reserved", decl.key),
                );
            } else if !keys.insert(decl.key.as_str()) {
                issues.error(
                    IssueCategory::Schema,
                    format!("Duplicate grouping level key '{}'", decl.key),
                );
            }

            if decl.label.trim().is_empty() {
                issues.error(
                    IssueCategory::Schema,
                    format!("Grouping level '{}' needs a non-empty label", decl.key),
                );
            }

            if let Some(title_key) = decl.title_key.as_deref() {
                if !FIELD_KEY.is_match(title_key) || KNOWN_KEYS.contains(&title_key) {
                    issues.error(
                        IssueCategory::Schema,
                        format!(
                            "Grouping level '{}' title_key '{title_key}' is not a usable field key",
                            decl.key
                        ),
                    );
                } else if title_key == decl.key {
                    issues.error(
                        IssueCategory::Schema,
                        format!(
                            "Grouping level '{}' title_key must differ from its key",
                            decl.key
                        ),
                    );
                }
            }

            if let Some(template) = decl.heading_template.as_deref() {
                for name in unknown_placeholders(template) {
                    issues.error(
                        IssueCategory::Schema,
                        format!(
                            "Grouping level '{}' heading_template uses unknown placeholder '{{{name}}}'",
                            decl.key
                        ),
                    );
                }
            }

            match PageBreakMode::parse(&decl.page_break) {
                Some(mode) => levels.push(GroupingLevel::compile(decl, mode)),
                None => issues.error(
                    IssueCategory::Schema,
                    format!(
                        "Grouping level '{}' page_break '{}' must be 'none' or 'between-groups'",
                        decl.key, decl.page_break
                    ),
                ),
            }
        }

        if issues.has_errors() {
            return (Self::default(), issues);
        }
        (Self { levels }, issues)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Warn about grouping fields that carry lists.
    ///
    /// Such a value is ignored by the assembler, so the level inherits instead.
    #[must_use]
    pub fn check(&self, meta: &DocumentMeta) -> IssueLog {
        let mut issues = IssueLog::new();
        for level in &self.levels {
            let keys = std::iter::once(level.key.as_str()).chain(level.title_key.as_deref());
            for key in keys {
                if meta.field(key).is_some_and(HeaderValue::is_list) {
                    issues.warning(
                        IssueCategory::Metadata,
                        format!(
                            "Grouping field '{key}' must be a scalar; the list value is ignored"
                        ),
                    );
                }
            }
        }
        issues
    }
}
