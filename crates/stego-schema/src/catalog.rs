//! Entity-category schema.
//!
//! Each category contributes a header field (`key`), an identifier prefix,
//! and a notes file under `spine/`. A category with prefix `CHAR` accepts
//! identifiers matching `^CHAR-[A-Z0-9-]+$`.

use std::collections::HashSet;

use regex::Regex;
use serde::Serialize;
use stego_config::CategoryDecl;
use stego_core::document::KNOWN_KEYS;
use stego_core::{COMMENT_ID_PREFIX, IssueCategory, IssueLog};

use crate::patterns::{FIELD_KEY, NOTES_FILE, PREFIX};

/// A validated category with its compiled identifier patterns.
#[derive(Debug, Clone, Serialize)]
pub struct CategorySchema {
    pub key: String,
    pub prefix: String,
    pub notes_file: String,
    /// Anchored pattern for one header list entry.
    #[serde(rename = "pattern", serialize_with = "serialize_regex")]
    pub id_pattern: Regex,
    /// Unanchored pattern for harvesting identifiers from text.
    #[serde(skip)]
    pub scan_pattern: Regex,
}

impl CategorySchema {
    fn compile(decl: &CategoryDecl) -> Option<Self> {
        let prefix = regex::escape(&decl.prefix);
        let id_pattern = Regex::new(&format!("^{prefix}-[A-Z0-9-]+$")).ok()?;
        let scan_pattern = Regex::new(&format!(r"\b{prefix}-[A-Z0-9-]+\b")).ok()?;
        Some(Self {
            key: decl.key.clone(),
            prefix: decl.prefix.clone(),
            notes_file: decl.notes_file.clone(),
            id_pattern,
            scan_pattern,
        })
    }

    /// Every identifier of this category mentioned in `text`, in order.
    pub fn find_ids<'t>(&self, text: &'t str) -> impl Iterator<Item = &'t str> + use<'_, 't> {
        self.scan_pattern.find_iter(text).map(move |m| m.as_str())
    }
}

fn serialize_regex<S: serde::Serializer>(regex: &Regex, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(regex.as_str())
}

/// The resolved category set of one project.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Catalog {
    pub categories: Vec<CategorySchema>,
    /// Alternation of every prefix, used to find identifiers leaked into prose.
    #[serde(skip)]
    inline_pattern: Option<Regex>,
}

impl Catalog {
    /// Validate category declarations.
    ///
    /// Any declaration error yields an empty catalog; the errors are returned
    /// so the caller can report them.
    #[must_use]
    pub fn resolve(decls: &[CategoryDecl]) -> (Self, IssueLog) {
        let mut issues = IssueLog::new();
        let mut keys = HashSet::new();
        let mut prefixes = HashSet::new();
        let mut notes_files = HashSet::new();

        for (index, decl) in decls.iter().enumerate() {
            let position = index + 1;
            if !FIELD_KEY.is_match(&decl.key) {
                issues.error(
                    IssueCategory::Schema,
                    format!(
                        "Category #{position} key '{}' must match ^[a-z][a-z0-9_-]*$",
                        decl.key
                    ),
                );
            } else if KNOWN_KEYS.contains(&decl.key.as_str()) {
                issues.error(
                    IssueCategory::Schema,
                    format!("Category #{position} key '{}' is reserved", decl.key),
                );
            }
            if !PREFIX.is_match(&decl.prefix) {
                issues.error(
                    IssueCategory::Schema,
                    format!(
                        "Category '{}' prefix '{}' must match ^[A-Z][A-Z0-9-]*$",
                        decl.key, decl.prefix
                    ),
                );
            } else if decl.prefix == COMMENT_ID_PREFIX {
                issues.error(
                    IssueCategory::Schema,
                    format!(
                        "Category '{}' prefix '{COMMENT_ID_PREFIX}' is reserved for comment ids",
                        decl.key
                    ),
                );
            }
            if !NOTES_FILE.is_match(&decl.notes_file) {
                issues.error(
                    IssueCategory::Schema,
                    format!(
                        "Category '{}' notes_file '{}' must be a markdown file name",
                        decl.key, decl.notes_file
                    ),
                );
            }

            if !keys.insert(decl.key.as_str()) {
                issues.error(
                    IssueCategory::Schema,
                    format!("Duplicate category key '{}'", decl.key),
                );
            }
            if !prefixes.insert(decl.prefix.as_str()) {
                issues.error(
                    IssueCategory::Schema,
                    format!("Duplicate category prefix '{}'", decl.prefix),
                );
            }
            if !notes_files.insert(decl.notes_file.as_str()) {
                issues.error(
                    IssueCategory::Schema,
                    format!("Duplicate category notes_file '{}'", decl.notes_file),
                );
            }
        }

        if issues.has_errors() {
            return (Self::default(), issues);
        }

        let categories: Vec<CategorySchema> =
            decls.iter().filter_map(CategorySchema::compile).collect();
        let inline_pattern = if categories.is_empty() {
            None
        } else {
            let alternation = categories
                .iter()
                .map(|category| regex::escape(&category.prefix))
                .collect::<Vec<_>>()
                .join("|");
            Regex::new(&format!(r"\b(?:{alternation})-[A-Z0-9-]+\b")).ok()
        };

        (
            Self {
                categories,
                inline_pattern,
            },
            issues,
        )
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    #[must_use]
    pub fn category(&self, key: &str) -> Option<&CategorySchema> {
        self.categories.iter().find(|category| category.key == key)
    }

    #[must_use]
    pub const fn inline_pattern(&self) -> Option<&Regex> {
        self.inline_pattern.as_ref()
    }
}
