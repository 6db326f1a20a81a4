use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Serialize;
use stego_core::{Issue, IssueLog};
use stego_engine::{ProjectContext, Totals};

use crate::cli::{GlobalFlags, OutputFormat};
use crate::output::{output, table};

/// Issues plus run totals, as printed by `validate` and `check-stage`.
#[derive(Debug, Serialize)]
pub struct IssueReport<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<&'a str>,
    pub passed: bool,
    pub totals: Totals,
    pub issues: &'a [Issue],
}

pub fn print_issue_report(report: &IssueReport<'_>, flags: &GlobalFlags) -> anyhow::Result<()> {
    match flags.format {
        OutputFormat::Json | OutputFormat::Raw => output(report, flags.format),
        OutputFormat::Table => {
            if !report.issues.is_empty() {
                println!(
                    "{}",
                    table::render_issue_table(report.issues, crate::output::table_options())
                );
            }
            if !flags.quiet {
                println!("{}", summary_line(report));
            }
            Ok(())
        }
    }
}

fn summary_line(report: &IssueReport<'_>) -> String {
    let totals = &report.totals;
    let verdict = match (report.stage, report.passed) {
        (Some(stage), true) => format!("ready for {stage}"),
        (Some(stage), false) => format!("not ready for {stage}"),
        (None, true) => "ok".to_string(),
        (None, false) => "failed".to_string(),
    };
    format!(
        "{verdict}: {} document(s), {} word(s), {} error(s), {} warning(s), {} unresolved comment(s)",
        totals.documents, totals.words, totals.errors, totals.warnings, totals.unresolved_comments
    )
}

/// Fail the command when `issues` carries blocking errors.
pub fn ensure_no_errors(issues: &IssueLog, what: &str) -> anyhow::Result<()> {
    if issues.has_errors() {
        anyhow::bail!("{what} found {} blocking error(s)", issues.error_count());
    }
    Ok(())
}

/// Resolve a user-supplied path.
///
/// Relative paths are taken from the project root when `--project` is given,
/// otherwise from the working directory.
pub fn resolve_input(
    path: &Path,
    ctx: &ProjectContext,
    flags: &GlobalFlags,
) -> anyhow::Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    if flags.project.is_some() {
        return Ok(ctx.root.join(path));
    }
    let cwd = std::env::current_dir().context("failed to read current directory")?;
    Ok(cwd.join(path))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use stego_config::ProjectConfig;
    use stego_core::IssueCategory;

    use super::*;

    #[test]
    fn summary_reports_stage_verdict() {
        let report = IssueReport {
            stage: Some("proof"),
            passed: false,
            totals: Totals {
                documents: 3,
                words: 1200,
                errors: 1,
                warnings: 2,
                unresolved_comments: 1,
            },
            issues: &[],
        };
        assert_eq!(
            summary_line(&report),
            "not ready for proof: 3 document(s), 1200 word(s), 1 error(s), 2 warning(s), 1 unresolved comment(s)"
        );
    }

    #[test]
    fn relative_paths_follow_project_flag() {
        let ctx = ProjectContext::new(PathBuf::from("/work/novel"), ProjectConfig::default());
        let mut flags = GlobalFlags {
            format: OutputFormat::Json,
            quiet: false,
            verbose: false,
            project: Some("/work/novel".into()),
        };
        let file = Path::new("manuscript/100-a.md");
        assert_eq!(
            resolve_input(file, &ctx, &flags).unwrap(),
            PathBuf::from("/work/novel/manuscript/100-a.md")
        );
        assert_eq!(
            resolve_input(Path::new("/tmp/out.md"), &ctx, &flags).unwrap(),
            PathBuf::from("/tmp/out.md")
        );

        flags.project = None;
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(resolve_input(file, &ctx, &flags).unwrap(), cwd.join(file));
    }

    #[test]
    fn warnings_do_not_block() {
        let mut issues = IssueLog::new();
        issues.warning(IssueCategory::Ordering, "two-digit prefix");
        assert!(ensure_no_errors(&issues, "validation").is_ok());

        issues.error(IssueCategory::Ordering, "duplicate");
        let error = ensure_no_errors(&issues, "validation").unwrap_err();
        assert_eq!(error.to_string(), "validation found 1 blocking error(s)");
    }
}
