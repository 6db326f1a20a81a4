//! Compile the sorted document list into one markdown manuscript.
//!
//! Assembly walks the documents strictly in order: each document's effective
//! grouping state depends on the previous one.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use stego_config::ProjectInfo;
use stego_core::{CoreError, Document};
use stego_schema::{GroupingSchema, PageBreakMode};

use crate::error::EngineError;
use crate::inspector::InspectionReport;

pub const PAGE_BREAK_MARKER: &str = r#"<div style="page-break-before: always;"></div>"#;
pub const TOC_MARKER: &str = "## Table of Contents";

const MAX_HEADING_DEPTH: usize = 6;

// ---------------------------------------------------------------------------
// Grouping state
// ---------------------------------------------------------------------------

/// Effective value of one grouping level at one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupState {
    pub value: Option<String>,
    pub title: Option<String>,
    /// The value differs from the previous document's, or an enclosing level
    /// changed here.
    pub changed: bool,
}

/// Per document, per level effective grouping state.
///
/// A document that does not set a level's field inherits the previous
/// document's value. A group title is inherited only while the value stays
/// the same.
#[must_use]
pub fn compute_group_states(
    documents: &[Document],
    grouping: &GroupingSchema,
) -> Vec<Vec<GroupState>> {
    let mut previous = vec![GroupState::default(); grouping.len()];
    let mut states = Vec::with_capacity(documents.len());

    for document in documents {
        let mut parent_changed = false;
        let mut current = Vec::with_capacity(grouping.len());

        for (level, prior) in grouping.levels.iter().zip(&previous) {
            let value = level
                .value_of(&document.meta)
                .or_else(|| prior.value.clone());
            let changed = parent_changed || value != prior.value;
            let title = level.title_of(&document.meta).or_else(|| {
                if value == prior.value {
                    prior.title.clone()
                } else {
                    None
                }
            });
            parent_changed |= changed;
            current.push(GroupState {
                value,
                title,
                changed,
            });
        }

        previous.clone_from(&current);
        states.push(current);
    }
    states
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
struct TocEntry {
    depth: usize,
    text: String,
    anchor: String,
}

/// GitHub-style heading anchors, deduplicated with `-1`, `-2`, ...
#[derive(Debug, Default)]
struct AnchorSet {
    seen: HashMap<String, usize>,
}

impl AnchorSet {
    fn anchor(&mut self, heading: &str) -> String {
        let base: String = heading
            .trim()
            .to_lowercase()
            .chars()
            .filter_map(|ch| match ch {
                ' ' => Some('-'),
                ch if ch.is_alphanumeric() || ch == '-' || ch == '_' => Some(ch),
                _ => None,
            })
            .collect();
        let count = self.seen.entry(base.clone()).or_insert(0);
        let anchor = if *count == 0 {
            base
        } else {
            format!("{base}-{count}")
        };
        *count += 1;
        anchor
    }
}

fn heading(depth: usize, text: &str) -> String {
    format!("{} {text}", "#".repeat(depth.min(MAX_HEADING_DEPTH)))
}

/// Render the compiled manuscript.
///
/// The caller must have confirmed the documents carry no blocking errors.
/// `generated_at` is stamped into the first line.
#[must_use]
pub fn assemble_manuscript(
    documents: &[Document],
    grouping: &GroupingSchema,
    project: &ProjectInfo,
    generated_at: DateTime<Utc>,
) -> String {
    let mut anchors = AnchorSet::default();
    anchors.anchor(&project.title);
    anchors.anchor("Table of Contents");

    let mut toc = Vec::new();
    let mut sections = Vec::new();
    let states = compute_group_states(documents, grouping);
    let document_depth = 2 + grouping.len();

    for (document, levels) in documents.iter().zip(&states) {
        let needs_break = grouping.levels.iter().zip(levels).any(|(level, state)| {
            state.changed && level.page_break == PageBreakMode::BetweenGroups
        });
        if needs_break {
            sections.push(PAGE_BREAK_MARKER.to_string());
        }

        for (index, (level, state)) in grouping.levels.iter().zip(levels).enumerate() {
            if !state.changed || !level.inject_heading {
                continue;
            }
            let Some(value) = state.value.as_deref() else {
                continue;
            };
            let text = level.format_heading(value, state.title.as_deref());
            sections.push(heading(2 + index, &text));
            toc.push(TocEntry {
                depth: index,
                anchor: anchors.anchor(&text),
                text,
            });
        }

        sections.push(heading(document_depth, &document.title));
        toc.push(TocEntry {
            depth: grouping.len(),
            anchor: anchors.anchor(&document.title),
            text: document.title.clone(),
        });
        sections.push(provenance(document));

        let body = document.body.trim();
        if !body.is_empty() {
            sections.push(body.to_string());
        }
    }

    let mut blocks = vec![
        format!(
            "<!-- generated: {} -->",
            generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
        ),
        heading(1, &project.title),
    ];
    if let Some(subtitle) = project.subtitle.as_deref() {
        blocks.push(format!("_{subtitle}_"));
    }
    if let Some(author) = project.author.as_deref() {
        blocks.push(format!("By {author}"));
    }
    blocks.push(TOC_MARKER.to_string());
    if !toc.is_empty() {
        blocks.push(render_toc(&toc));
    }
    blocks.extend(sections);

    let mut output = blocks.join("\n\n");
    output.push('\n');
    output
}

fn provenance(document: &Document) -> String {
    let order = document
        .order
        .map_or_else(|| "none".to_string(), |order| order.to_string());
    let status = document.meta.status.as_deref().unwrap_or("none");
    format!(
        "<!-- source: {} | order: {order} | status: {status} -->",
        document.path
    )
}

fn render_toc(entries: &[TocEntry]) -> String {
    entries
        .iter()
        .map(|entry| {
            format!(
                "{}- [{}](#{})",
                "  ".repeat(entry.depth),
                entry.text,
                entry.anchor
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write the compiled text, replacing any previous output.
pub fn write_compiled(path: &Path, text: &str) -> Result<(), EngineError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| CoreError::io(parent, e))?;
    }
    fs::write(path, text).map_err(|e| CoreError::io(path, e))?;
    Ok(())
}

/// Assemble an error-free inspection and write it to `output`.
pub fn build_manuscript(
    report: &InspectionReport,
    project: &ProjectInfo,
    output: &Path,
    generated_at: DateTime<Utc>,
) -> Result<(), EngineError> {
    if report.has_errors() {
        return Err(EngineError::Blocked(report.issues.error_count()));
    }
    let text = assemble_manuscript(&report.documents, &report.grouping, project, generated_at);
    write_compiled(output, &text)?;
    tracing::info!(
        output = %output.display(),
        documents = report.documents.len(),
        "manuscript compiled"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use stego_config::GroupingLevelDecl;
    use stego_core::{DocumentMeta, HeaderMap, HeaderValue};

    use super::*;

    fn document(path: &str, order: u32, fields: &[(&str, &str)], body: &str) -> Document {
        let mut header = HeaderMap::new();
        header.insert("status", HeaderValue::String("draft".into()));
        for (key, value) in fields {
            header.insert(*key, HeaderValue::String((*value).into()));
        }
        let (meta, _) = DocumentMeta::from_header(header);
        Document {
            path: path.into(),
            title: meta.title.clone().unwrap_or_else(|| path.into()),
            order: Some(order),
            meta,
            body: body.into(),
            comments: Vec::new(),
            references: Vec::new(),
            word_count: 0,
        }
    }

    fn level(key: &str, label: &str, page_break: &str) -> GroupingLevelDecl {
        GroupingLevelDecl {
            key: key.into(),
            label: label.into(),
            title_key: Some(format!("{key}_title")),
            page_break: page_break.into(),
            ..GroupingLevelDecl::default()
        }
    }

    fn schema(decls: &[GroupingLevelDecl]) -> GroupingSchema {
        let (schema, issues) = GroupingSchema::resolve(decls);
        assert!(issues.is_empty());
        schema
    }

    fn stamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn chapter_is_inherited_and_changes_only_at_boundaries() {
        let grouping = schema(&[level("chapter", "Chapter", "none")]);
        let documents = vec![
            document("a.md", 100, &[("chapter", "1"), ("chapter_title", "Ashore")], ""),
            document("b.md", 110, &[], ""),
            document("c.md", 120, &[("chapter", "2")], ""),
        ];

        let states = compute_group_states(&documents, &grouping);
        let chapters: Vec<(Option<&str>, bool)> = states
            .iter()
            .map(|levels| (levels[0].value.as_deref(), levels[0].changed))
            .collect();
        assert_eq!(
            chapters,
            vec![(Some("1"), true), (Some("1"), false), (Some("2"), true)]
        );
        assert_eq!(states[1][0].title.as_deref(), Some("Ashore"));
        assert_eq!(states[2][0].title, None);
    }

    #[test]
    fn child_level_restarts_when_parent_changes() {
        let grouping = schema(&[
            level("part", "Part", "none"),
            level("chapter", "Chapter", "none"),
        ]);
        let documents = vec![
            document("a.md", 100, &[("part", "1"), ("chapter", "1")], ""),
            document("b.md", 200, &[("part", "2")], ""),
        ];
        let states = compute_group_states(&documents, &grouping);
        assert!(states[1][0].changed);
        assert!(states[1][1].changed);
        assert_eq!(states[1][1].value.as_deref(), Some("1"));
    }

    #[test]
    fn one_page_break_per_changed_document() {
        let grouping = schema(&[
            level("part", "Part", "between-groups"),
            level("chapter", "Chapter", "between-groups"),
        ]);
        let documents = vec![
            document("a.md", 100, &[("part", "1"), ("chapter", "1")], "One."),
            document("b.md", 110, &[], "Two."),
            document("c.md", 200, &[("part", "2"), ("chapter", "1")], "Three."),
            document("d.md", 210, &[], "Four."),
        ];

        let text = assemble_manuscript(&documents, &grouping, &ProjectInfo::default(), stamp());
        assert_eq!(text.matches(PAGE_BREAK_MARKER).count(), 2);
    }

    #[test]
    fn renders_full_layout() {
        let grouping = schema(&[level("chapter", "Chapter", "none")]);
        let mut first = document(
            "manuscript/100-arrival.md",
            100,
            &[("chapter", "1"), ("chapter_title", "Ashore"), ("title", "Arrival")],
            "\nThe boat docked.\n",
        );
        first.title = "Arrival".into();
        let mut second = document("manuscript/110-arrival.md", 110, &[], "Night fell.");
        second.title = "Arrival".into();
        let project = ProjectInfo {
            title: "Harbor".into(),
            subtitle: Some("A Novel".into()),
            author: Some("J. Doe".into()),
        };

        let text = assemble_manuscript(&[first, second], &grouping, &project, stamp());
        let expected = "\
<!-- generated: 2026-03-01T12:00:00Z -->

# Harbor

_A Novel_

By J. Doe

## Table of Contents

- [Chapter 1: Ashore](#chapter-1-ashore)
  - [Arrival](#arrival)
  - [Arrival](#arrival-1)

## Chapter 1: Ashore

### Arrival

<!-- source: manuscript/100-arrival.md | order: 100 | status: draft -->

The boat docked.

### Arrival

<!-- source: manuscript/110-arrival.md | order: 110 | status: draft -->

Night fell.
";
        assert_eq!(text, expected);
    }

    #[test]
    fn heading_injection_can_be_disabled() {
        let decl = GroupingLevelDecl {
            inject_heading: false,
            ..level("chapter", "Chapter", "none")
        };
        let grouping = schema(&[decl]);
        let documents = vec![document("a.md", 100, &[("chapter", "1")], "Body.")];
        let text = assemble_manuscript(&documents, &grouping, &ProjectInfo::default(), stamp());
        assert!(!text.contains("## Chapter 1"));
        assert!(text.contains("### a.md"));
    }

    #[test]
    fn write_compiled_replaces_previous_output() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("dist").join("out.md");
        write_compiled(&path, "first version\n").unwrap();
        write_compiled(&path, "second\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "second\n");
    }
}
