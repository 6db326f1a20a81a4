use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use stego_config::{CategoryDecl, ProjectConfig};
use stego_core::{IssueCategory, Severity};
use stego_engine::{ProjectContext, inspect_file, inspect_project};
use tempfile::TempDir;

fn project(files: &[(&str, &str)]) -> (TempDir, ProjectContext) {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("manuscript")).unwrap();
    fs::create_dir_all(dir.path().join("spine")).unwrap();
    for (name, content) in files {
        let path = dir.path().join(name);
        fs::write(path, content).unwrap();
    }

    let mut config = ProjectConfig::default();
    config.categories = vec![CategoryDecl {
        key: "characters".into(),
        prefix: "CHAR".into(),
        notes_file: "characters.md".into(),
    }];
    let ctx = ProjectContext::new(dir.path().to_path_buf(), config);
    (dir, ctx)
}

const DRAFT: &str = "---\nstatus: draft\n---\n\nProse.\n";

#[test]
fn duplicate_order_keys_are_one_error_naming_both_files() {
    let (_dir, ctx) = project(&[
        ("manuscript/100-a.md", DRAFT),
        ("manuscript/100-b.md", DRAFT),
        ("spine/characters.md", ""),
    ]);

    let report = inspect_project(&ctx).unwrap();
    let duplicates: Vec<_> = report
        .issues
        .iter()
        .filter(|issue| issue.category == IssueCategory::Ordering)
        .collect();
    assert_eq!(duplicates.len(), 1);
    assert_eq!(duplicates[0].severity, Severity::Error);
    assert!(duplicates[0].message.contains("manuscript/100-a.md"));
    assert!(duplicates[0].message.contains("manuscript/100-b.md"));
}

#[test]
fn documents_sort_by_order_with_unordered_last() {
    let (_dir, ctx) = project(&[
        ("manuscript/200-b.md", DRAFT),
        ("manuscript/zz-notes.md", DRAFT),
        ("manuscript/100-a.md", DRAFT),
        ("manuscript/050-prologue.md", DRAFT),
        ("spine/characters.md", ""),
    ]);

    let report = inspect_project(&ctx).unwrap();
    let paths: Vec<&str> = report.documents.iter().map(|doc| doc.path.as_str()).collect();
    assert_eq!(
        paths,
        vec![
            "manuscript/050-prologue.md",
            "manuscript/100-a.md",
            "manuscript/200-b.md",
            "manuscript/zz-notes.md",
        ]
    );
    assert_eq!(report.issues.error_count(), 1);
    assert_eq!(report.documents[1].title, "A");
}

#[test]
fn inline_identifier_is_reported_at_source_line() {
    let text = "---\nstatus: draft\ncharacters: [CHAR-MIRA]\n---\n\nThe boat docked.\nCHAR-MIRA waved.\n";
    let (_dir, ctx) = project(&[
        ("manuscript/100-arrival.md", text),
        ("spine/characters.md", "# CHAR-MIRA\n"),
    ]);

    let report = inspect_project(&ctx).unwrap();
    let leaks: Vec<_> = report
        .issues
        .iter()
        .filter(|issue| issue.category == IssueCategory::Continuity)
        .collect();
    assert_eq!(leaks.len(), 1);
    assert_eq!(leaks[0].line, Some(7));
    assert_eq!(leaks[0].file.as_deref(), Some("manuscript/100-arrival.md"));
    assert_eq!(report.documents[0].references, vec!["CHAR-MIRA"]);
}

#[test]
fn prose_after_comment_appendix_keeps_its_line() {
    let text = "\
---
status: draft
---

Prose.

<!-- stego-comments:start -->
### CMT-0001
<!-- meta64: eyJzdGF0dXMiOiJvcGVuIn0 -->
> _2026-01-02T10:00:00Z | Editor_
>
> Is CHAR-MIRA here?
<!-- stego-comments:end -->

CHAR-MIRA after.
";
    let (_dir, ctx) = project(&[
        ("manuscript/100-a.md", text),
        ("spine/characters.md", "# CHAR-MIRA\n"),
    ]);

    let report = inspect_project(&ctx).unwrap();
    let leaks: Vec<_> = report
        .issues
        .iter()
        .filter(|issue| issue.category == IssueCategory::Continuity)
        .collect();
    assert_eq!(leaks.len(), 1);
    assert_eq!(leaks[0].line, Some(15));
    assert_eq!(report.documents[0].comments.len(), 1);
}

#[test]
fn unknown_references_and_missing_notes_are_warnings() {
    let text = "---\nstatus: draft\ncharacters: [CHAR-GHOST]\n---\n\nProse.\n";
    let (_dir, ctx) = project(&[("manuscript/100-a.md", text)]);

    let report = inspect_project(&ctx).unwrap();
    assert!(!report.has_errors());
    assert_eq!(report.issues.warning_count(), 2);
    assert!(
        report
            .issues
            .iter()
            .any(|issue| issue.message.contains("CHAR-GHOST"))
    );
}

#[test]
fn unterminated_header_still_lists_the_document() {
    let (_dir, ctx) = project(&[
        ("manuscript/100-a.md", "---\nstatus: draft\n\nNo closer.\n"),
        ("spine/characters.md", ""),
    ]);

    let report = inspect_project(&ctx).unwrap();
    assert_eq!(report.documents.len(), 1);
    let structure: Vec<_> = report
        .issues
        .iter()
        .filter(|issue| issue.category == IssueCategory::Structure)
        .collect();
    assert_eq!(structure.len(), 1);
    assert_eq!(structure[0].line, Some(1));
}

#[test]
fn comment_issues_point_at_source_lines() {
    let text = "\
---
status: draft
---

Prose.

<!-- stego-comments:start -->
### CMT-0001
> _2026-01-02T10:00:00Z | Editor_
>
> Tighten this.
<!-- stego-comments:end -->
";
    let (_dir, ctx) = project(&[("manuscript/100-a.md", text), ("spine/characters.md", "")]);

    let report = inspect_project(&ctx).unwrap();
    let comments: Vec<_> = report
        .issues
        .iter()
        .filter(|issue| issue.category == IssueCategory::Comments)
        .collect();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].line, Some(9));
    assert_eq!(report.documents[0].comments.len(), 1);
    assert_eq!(report.totals.unresolved_comments, 1);
    assert_eq!(report.documents[0].word_count, 1);
}

#[test]
fn inspect_file_checks_one_document() {
    let (dir, ctx) = project(&[
        ("manuscript/100-a.md", DRAFT),
        ("manuscript/bad.md", DRAFT),
        ("spine/characters.md", ""),
    ]);

    let report = inspect_file(&ctx, Path::new("manuscript/100-a.md")).unwrap();
    assert_eq!(report.documents.len(), 1);
    assert!(report.issues.is_empty());

    let missing = inspect_file(&ctx, &dir.path().join("manuscript/404-gone.md"));
    assert!(missing.is_err());
}

#[test]
fn missing_manuscript_directory_is_fatal() {
    let dir = TempDir::new().unwrap();
    let ctx = ProjectContext::new(dir.path().to_path_buf(), ProjectConfig::default());
    assert!(inspect_project(&ctx).is_err());
}

#[test]
fn invalid_catalog_still_validates_documents() {
    let (_dir, mut ctx) = project(&[("manuscript/100-a.md", "Prose only.\n")]);
    ctx.config.categories[0].prefix = "char".into();

    let report = inspect_project(&ctx).unwrap();
    assert!(report.catalog.is_empty());
    assert!(
        report
            .issues
            .iter()
            .any(|issue| issue.category == IssueCategory::Schema)
    );
    assert!(
        report
            .issues
            .iter()
            .any(|issue| issue.message.contains("Missing required metadata 'status'"))
    );
    assert_eq!(report.documents.len(), 1);
}
