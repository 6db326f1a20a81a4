use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use serde::Serialize;
use stego_engine::{InspectionReport, ProjectContext, build_manuscript, inspect_project};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::BuildArgs;
use crate::commands::shared::{IssueReport, print_issue_report, resolve_input};
use crate::output::output;

#[derive(Debug, Serialize)]
pub struct BuildResponse {
    pub output: PathBuf,
    pub documents: usize,
    pub words: usize,
    pub warnings: usize,
}

/// Handle `stego build`.
pub fn handle(args: &BuildArgs, ctx: &ProjectContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let target = match &args.output {
        Some(path) => resolve_input(path, ctx, flags)?,
        None => ctx.output_path(),
    };
    let report = compile(ctx, &target, flags)?;

    output(
        &BuildResponse {
            output: target,
            documents: report.totals.documents,
            words: report.totals.words,
            warnings: report.totals.warnings,
        },
        flags.format,
    )
}

/// Inspect and compile to `target`. Prints the issue report when the
/// manuscript is blocked.
pub fn compile(
    ctx: &ProjectContext,
    target: &Path,
    flags: &GlobalFlags,
) -> anyhow::Result<InspectionReport> {
    let report = inspect_project(ctx)?;
    if report.has_errors() {
        print_issue_report(
            &IssueReport {
                stage: None,
                passed: false,
                totals: report.totals,
                issues: report.issues.as_slice(),
            },
            flags,
        )?;
    }

    build_manuscript(&report, &ctx.config.project, target, Utc::now())
        .with_context(|| format!("failed to compile {}", target.display()))?;
    Ok(report)
}
