//! Stage gate: is the manuscript ready for a given editorial stage?

use stego_config::{ManuscriptConfig, StageConfig};
use stego_core::{Issue, IssueCategory, IssueLog};

use crate::error::EngineError;
use crate::inspector::InspectionReport;

/// Check every inspected document against `stage`.
///
/// A document whose status ranks below `stage` is an error. Unresolved comment
/// threads are errors when `stage` is listed in
/// `unresolved_comments_block`, warnings otherwise. Inspection issues are not
/// repeated in the returned log.
pub fn check_stage(
    report: &InspectionReport,
    manuscript: &ManuscriptConfig,
    policy: &StageConfig,
    stage: &str,
) -> Result<IssueLog, EngineError> {
    let Some(required_rank) = manuscript.status_rank(stage) else {
        return Err(EngineError::UnknownStage {
            stage: stage.to_string(),
            allowed: manuscript.allowed_statuses.join(", "),
        });
    };
    let block_comments = policy.blocks_unresolved_comments(stage);
    let mut issues = IssueLog::new();

    for document in &report.documents {
        match document.meta.status.as_deref() {
            Some(status) => match manuscript.status_rank(status) {
                Some(rank) if rank >= required_rank => {}
                Some(_) => issues.push(
                    Issue::error(
                        IssueCategory::Stage,
                        format!("Status '{status}' is below stage '{stage}'"),
                    )
                    .in_file(&document.path),
                ),
                None => issues.push(
                    Issue::error(
                        IssueCategory::Stage,
                        format!("Status '{status}' is not a known stage"),
                    )
                    .in_file(&document.path),
                ),
            },
            None => issues.push(
                Issue::error(
                    IssueCategory::Stage,
                    format!("No status set; stage '{stage}' needs one"),
                )
                .in_file(&document.path),
            ),
        }

        for thread in document.comments.iter().filter(|thread| !thread.is_resolved()) {
            let message = format!("Unresolved comment {} at stage '{stage}'", thread.id);
            let issue = if block_comments {
                Issue::error(IssueCategory::Stage, message)
            } else {
                Issue::warning(IssueCategory::Stage, message)
            };
            issues.push(issue.in_file(&document.path));
        }
    }

    tracing::info!(
        stage,
        errors = issues.error_count(),
        warnings = issues.warning_count(),
        "stage gate evaluated"
    );
    Ok(issues)
}
