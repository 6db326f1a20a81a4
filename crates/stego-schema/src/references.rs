//! Entity references in header fields and leaked identifiers in prose.

use std::collections::HashSet;

use stego_core::{DocumentMeta, HeaderValue, IssueCategory, IssueLog};

use crate::catalog::Catalog;

/// Validate every category field of `meta` and collect the identifiers.
///
/// Returns the deduplicated identifiers in header order together with the
/// issues for non-list fields and entries that miss the category pattern.
#[must_use]
pub fn extract_references(meta: &DocumentMeta, catalog: &Catalog) -> (Vec<String>, IssueLog) {
    let mut issues = IssueLog::new();
    let mut references = Vec::new();
    let mut seen = HashSet::new();

    for category in &catalog.categories {
        let Some(value) = meta.field(&category.key) else {
            continue;
        };
        let HeaderValue::List(entries) = value else {
            issues.error(
                IssueCategory::Metadata,
                format!(
                    "Metadata '{}' must be a list of {} identifiers, found {}",
                    category.key,
                    category.prefix,
                    value.type_name()
                ),
            );
            continue;
        };

        for entry in entries {
            if !category.id_pattern.is_match(entry) {
                issues.error(
                    IssueCategory::Metadata,
                    format!(
                        "Invalid {} reference '{entry}'; expected pattern {}",
                        category.key,
                        category.id_pattern.as_str()
                    ),
                );
                continue;
            }
            if seen.insert(entry.as_str()) {
                references.push(entry.clone());
            }
        }
    }

    (references, issues)
}

/// Report every catalog identifier that appears in `body`.
///
/// Identifiers belong in header fields only. Line numbers are 1-based within
/// `body`.
#[must_use]
pub fn scan_inline_identifiers(body: &str, catalog: &Catalog) -> IssueLog {
    let mut issues = IssueLog::new();
    let Some(pattern) = catalog.inline_pattern() else {
        return issues;
    };

    for (index, line) in body.lines().enumerate() {
        for found in pattern.find_iter(line) {
            issues.error_at(
                IssueCategory::Continuity,
                index + 1,
                format!(
                    "Identifier '{}' appears in prose; canonical ids belong in metadata fields",
                    found.as_str()
                ),
            );
        }
    }
    issues
}
