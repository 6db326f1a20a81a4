//! Required metadata keys and the status vocabulary.

use std::collections::HashSet;

use serde::Serialize;
use stego_config::ManuscriptConfig;
use stego_core::{DocumentMeta, IssueCategory, IssueLog};

use crate::patterns::HEADER_KEY;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldPolicy {
    pub required: Vec<String>,
    pub allowed_statuses: Vec<String>,
}

impl FieldPolicy {
    /// Validate the manuscript policy. Unusable required keys are reported and
    /// dropped; the rest of the policy still applies.
    #[must_use]
    pub fn resolve(config: &ManuscriptConfig) -> (Self, IssueLog) {
        let mut issues = IssueLog::new();
        let mut required = Vec::new();
        for key in &config.required_metadata {
            if !HEADER_KEY.is_match(key) {
                issues.error(
                    IssueCategory::Schema,
                    format!("Required metadata key '{key}' is not a valid header key"),
                );
            } else if !required.contains(key) {
                required.push(key.clone());
            }
        }

        let mut seen = HashSet::new();
        for status in &config.allowed_statuses {
            if status.trim().is_empty() {
                issues.error(IssueCategory::Schema, "Allowed status values must be non-empty");
            } else if !seen.insert(status.as_str()) {
                issues.error(
                    IssueCategory::Schema,
                    format!("Duplicate allowed status '{status}'"),
                );
            }
        }

        (
            Self {
                required,
                allowed_statuses: config.allowed_statuses.clone(),
            },
            issues,
        )
    }

    #[must_use]
    pub fn check(&self, meta: &DocumentMeta) -> IssueLog {
        let mut issues = IssueLog::new();
        for key in &self.required {
            if !meta.has_key(key) {
                issues.error(
                    IssueCategory::Metadata,
                    format!("Missing required metadata '{key}'"),
                );
            }
        }

        if let Some(status) = meta.status.as_deref() {
            if !self.allowed_statuses.iter().any(|allowed| allowed == status) {
                issues.error(
                    IssueCategory::Metadata,
                    format!(
                        "Invalid status '{status}'; allowed: {}",
                        self.allowed_statuses.join(", ")
                    ),
                );
            }
        }
        issues
    }
}
