use stego_engine::{ProjectContext, inspect_file, inspect_project};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ValidateArgs;
use crate::commands::shared::{IssueReport, ensure_no_errors, print_issue_report, resolve_input};

/// Handle `stego validate`.
pub fn handle(args: &ValidateArgs, ctx: &ProjectContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let report = match &args.file {
        Some(file) => inspect_file(ctx, &resolve_input(file, ctx, flags)?)?,
        None => inspect_project(ctx)?,
    };

    print_issue_report(
        &IssueReport {
            stage: None,
            passed: !report.has_errors(),
            totals: report.totals,
            issues: report.issues.as_slice(),
        },
        flags,
    )?;
    ensure_no_errors(&report.issues, "validation")
}
