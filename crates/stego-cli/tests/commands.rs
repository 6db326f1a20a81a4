use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use pretty_assertions::assert_eq;
use tempfile::TempDir;

const PROJECT: &str = r#"
[project]
title = "Harbor Lights"

[[categories]]
key = "characters"
prefix = "CHAR"
notes_file = "characters.md"

[[compile.levels]]
key = "chapter"
label = "Chapter"
"#;

fn project() -> TempDir {
    let dir = TempDir::new().expect("tempdir should create");
    fs::write(dir.path().join("stego-project.toml"), PROJECT).expect("project file");
    fs::create_dir_all(dir.path().join("manuscript")).expect("manuscript dir");
    fs::create_dir_all(dir.path().join("spine")).expect("spine dir");
    fs::write(dir.path().join("spine/characters.md"), "# CHAR-MIRA\n").expect("notes");
    fs::write(
        dir.path().join("manuscript/100-arrival.md"),
        "---\nstatus: proof\nchapter: 1\ncharacters: [CHAR-MIRA]\n---\n\nThe boat docked.\n",
    )
    .expect("manuscript file");
    dir
}

fn stego(root: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_stego"))
        .current_dir(root)
        .env("XDG_CONFIG_HOME", root.join(".config"))
        .env_remove("STEGO_LOG")
        .args(args)
        .output()
        .expect("stego should run")
}

fn json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be json")
}

#[test]
fn validate_clean_project_succeeds() {
    let dir = project();
    let out = stego(dir.path(), &["--format", "json", "validate"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let report = json(&out);
    assert_eq!(report["passed"], true);
    assert_eq!(report["totals"]["documents"], 1);
    assert_eq!(report["issues"].as_array().map(Vec::len), Some(0));
}

#[test]
fn validate_reports_duplicates_and_exits_nonzero() {
    let dir = project();
    fs::write(
        dir.path().join("manuscript/100-again.md"),
        "---\nstatus: draft\n---\n\nAgain.\n",
    )
    .expect("manuscript file");

    let out = stego(dir.path(), &["--format", "json", "validate"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("stego error: validation found 1"));

    let report = json(&out);
    assert_eq!(report["passed"], false);
    assert_eq!(report["issues"][0]["category"], "ordering");
}

#[test]
fn build_writes_compiled_manuscript_from_subdirectory() {
    let dir = project();
    let out = stego(&dir.path().join("manuscript"), &["--format", "json", "build"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let compiled = dir.path().join("dist/harbor-lights.md");
    let text = fs::read_to_string(compiled).expect("compiled output");
    assert!(text.contains("## Chapter 1"));
    assert!(text.contains("The boat docked."));
    assert_eq!(json(&out)["documents"], 1);
}

#[test]
fn check_stage_passes_and_rejects_unknown_stage() {
    let dir = project();
    let ok = stego(dir.path(), &["--format", "json", "check-stage", "--stage", "proof"]);
    assert!(ok.status.success(), "{}", String::from_utf8_lossy(&ok.stderr));
    assert_eq!(json(&ok)["stage"], "proof");

    let final_stage = stego(dir.path(), &["check-stage", "--stage", "final"]);
    assert_eq!(final_stage.status.code(), Some(1));

    let unknown = stego(dir.path(), &["check-stage", "--stage", "published"]);
    assert_eq!(unknown.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&unknown.stderr).contains("unknown stage 'published'"));
}

#[test]
fn comments_lists_threads() {
    let dir = project();
    fs::write(
        dir.path().join("manuscript/110-night.md"),
        "---\nstatus: proof\n---\n\nNight fell.\n\n<!-- stego-comments:start -->\n### CMT-0001\n<!-- meta64: eyJzdGF0dXMiOiJvcGVuIn0 -->\n> _2026-01-02T10:00:00Z | Editor_\n>\n> Darker here.\n<!-- stego-comments:end -->\n",
    )
    .expect("manuscript file");

    let out = stego(
        dir.path(),
        &["--format", "json", "comments", "manuscript/110-night.md"],
    );
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let response = json(&out);
    assert_eq!(response["file"], "manuscript/110-night.md");
    assert_eq!(response["threads"][0]["id"], "CMT-0001");
    assert_eq!(response["threads"][0]["meta"]["status"], "open");
    assert_eq!(response["threads"][0]["messages"][0]["text"], "Darker here.");
}

#[test]
fn schema_prints_json_schema_without_project() {
    let dir = TempDir::new().expect("tempdir should create");
    let out = stego(dir.path(), &["schema"]);
    assert!(out.status.success());
    let schema = json(&out);
    assert!(schema["properties"]["categories"].is_object());
}

#[test]
fn missing_project_is_reported() {
    let dir = TempDir::new().expect("tempdir should create");
    let out = stego(dir.path(), &["validate"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("not a stego project"));
}

#[test]
fn project_flag_resolves_file_arguments_from_project_root() {
    let dir = project();
    let elsewhere = TempDir::new().expect("tempdir should create");
    let root = dir.path().to_str().expect("utf-8 temp path");

    let validate = stego(
        elsewhere.path(),
        &["--project", root, "--format", "json", "validate", "--file", "manuscript/100-arrival.md"],
    );
    assert!(validate.status.success(), "{}", String::from_utf8_lossy(&validate.stderr));
    assert_eq!(json(&validate)["totals"]["documents"], 1);

    let comments = stego(
        elsewhere.path(),
        &["--project", root, "--format", "json", "comments", "manuscript/100-arrival.md"],
    );
    assert!(comments.status.success(), "{}", String::from_utf8_lossy(&comments.stderr));
    assert_eq!(json(&comments)["file"], "manuscript/100-arrival.md");
}

#[test]
fn export_markdown_reports_exporter_format() {
    let dir = project();
    let out = stego(
        dir.path(),
        &["--format", "json", "export", "--to", "md", "--output", "out/novel.md"],
    );
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(json(&out)["format"], "md");

    let exported = fs::read_to_string(dir.path().join("out/novel.md")).expect("exported file");
    assert!(exported.contains("The boat docked."));
}
