use stego_core::IssueLog;
use stego_engine::{ProjectContext, Totals, check_stage, inspect_project};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::CheckStageArgs;
use crate::commands::shared::{IssueReport, ensure_no_errors, print_issue_report};

/// Handle `stego check-stage`.
pub fn handle(
    args: &CheckStageArgs,
    ctx: &ProjectContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let report = inspect_project(ctx)?;
    let gate = check_stage(
        &report,
        &ctx.config.manuscript,
        &ctx.config.stage,
        &args.stage,
    )?;

    let mut issues: IssueLog = report.issues.clone();
    issues.merge(gate);
    let totals = Totals {
        errors: issues.error_count(),
        warnings: issues.warning_count(),
        ..report.totals
    };

    print_issue_report(
        &IssueReport {
            stage: Some(&args.stage),
            passed: !issues.has_errors(),
            totals,
            issues: issues.as_slice(),
        },
        flags,
    )?;
    ensure_no_errors(&issues, &format!("stage check '{}'", args.stage))
}
