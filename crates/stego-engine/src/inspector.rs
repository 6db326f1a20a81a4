//! Project inspection: parse every manuscript file, validate it against the
//! resolved schemas, and check the cross-document rules (ordering,
//! duplicates, catalog references).
//!
//! Inspection never stops at the first faulty document. Every finding lands
//! in the returned report so one run surfaces the complete defect set.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use rayon::prelude::*;
use regex::Regex;
use serde::Serialize;
use stego_core::{CoreError, Document, DocumentMeta, Issue, IssueCategory, IssueLog};
use stego_parser::{parse_comment_appendix, parse_header_block};
use stego_schema::{
    Catalog, FieldPolicy, GroupingSchema, extract_references, scan_inline_identifiers,
};

use crate::context::{ProjectContext, SPINE_DIR};
use crate::error::EngineError;

static ORDER_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+)[-_]").expect("valid order prefix regex"));

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub documents: usize,
    pub words: usize,
    pub errors: usize,
    pub warnings: usize,
    pub unresolved_comments: usize,
}

/// Result of one inspection run.
#[derive(Debug, Clone, Serialize)]
pub struct InspectionReport {
    /// Sorted by order key; unordered documents last, by path.
    pub documents: Vec<Document>,
    pub issues: IssueLog,
    pub catalog: Catalog,
    pub grouping: GroupingSchema,
    pub totals: Totals,
}

impl InspectionReport {
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.issues.has_errors()
    }

    fn finish(mut self) -> Self {
        self.totals = Totals {
            documents: self.documents.len(),
            words: self.documents.iter().map(|doc| doc.word_count).sum(),
            errors: self.issues.error_count(),
            warnings: self.issues.warning_count(),
            unresolved_comments: self
                .documents
                .iter()
                .map(Document::unresolved_comments)
                .sum(),
        };
        self
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Inspect every `*.md` file in the project's manuscript directory.
pub fn inspect_project(ctx: &ProjectContext) -> Result<InspectionReport, EngineError> {
    let paths = manuscript_files(ctx)?;
    Ok(Inspector::new(ctx).run(&paths))
}

/// Inspect a single manuscript file against the project's schemas.
pub fn inspect_file(ctx: &ProjectContext, path: &Path) -> Result<InspectionReport, EngineError> {
    let path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        ctx.root.join(path)
    };
    if !path.is_file() {
        return Err(CoreError::io(
            &path,
            std::io::Error::new(std::io::ErrorKind::NotFound, "manuscript file not found"),
        )
        .into());
    }
    Ok(Inspector::new(ctx).run(&[path]))
}

fn manuscript_files(ctx: &ProjectContext) -> Result<Vec<PathBuf>, EngineError> {
    let dir = ctx.manuscript_dir();
    if !dir.is_dir() {
        return Err(EngineError::MissingManuscriptDir(dir));
    }

    let entries = fs::read_dir(&dir).map_err(|e| CoreError::io(&dir, e))?;
    let mut paths = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| CoreError::io(&dir, e))?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "md") {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

// ---------------------------------------------------------------------------
// Inspector
// ---------------------------------------------------------------------------

/// Schemas resolved once per run and shared read-only across documents.
struct Inspector<'a> {
    ctx: &'a ProjectContext,
    catalog: Catalog,
    grouping: GroupingSchema,
    fields: FieldPolicy,
    schema_issues: IssueLog,
}

impl<'a> Inspector<'a> {
    fn new(ctx: &'a ProjectContext) -> Self {
        let mut schema_issues = IssueLog::new();

        let (catalog, issues) = Catalog::resolve(&ctx.config.categories);
        schema_issues.merge(issues);
        let (fields, issues) = FieldPolicy::resolve(&ctx.config.manuscript);
        schema_issues.merge(issues);
        let (grouping, issues) = GroupingSchema::resolve(&ctx.config.compile.levels);
        schema_issues.merge(issues);

        Self {
            ctx,
            catalog,
            grouping,
            fields,
            schema_issues,
        }
    }

    fn run(self, paths: &[PathBuf]) -> InspectionReport {
        let parsed: Vec<(Option<Document>, IssueLog)> = paths
            .par_iter()
            .map(|path| self.parse_document(path))
            .collect();

        let mut issues = self.schema_issues.clone();
        let mut documents = Vec::with_capacity(parsed.len());
        for (document, document_issues) in parsed {
            issues.merge(document_issues);
            documents.extend(document);
        }

        issues.merge(duplicate_orders(&documents));
        documents.sort_by(|a, b| {
            (a.order.is_none(), a.order, &a.path).cmp(&(b.order.is_none(), b.order, &b.path))
        });
        issues.merge(self.check_known_references(&documents));

        tracing::info!(
            documents = documents.len(),
            errors = issues.error_count(),
            warnings = issues.warning_count(),
            "inspection finished"
        );

        InspectionReport {
            documents,
            issues,
            catalog: self.catalog,
            grouping: self.grouping,
            totals: Totals::default(),
        }
        .finish()
    }

    /// Parse and validate one file. Independent of every other document.
    fn parse_document(&self, path: &Path) -> (Option<Document>, IssueLog) {
        let rel = self.ctx.relative_path(path);
        let mut issues = IssueLog::new();

        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(error) => {
                tracing::warn!(file = %rel, %error, "failed to read manuscript file");
                issues.error(
                    IssueCategory::Structure,
                    format!("Unable to read file: {error}"),
                );
                return (None, issues.in_file(&rel));
            }
        };

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let (order, order_issues) = order_key(&file_name);
        issues.merge(order_issues);

        let require_header = self.ctx.config.manuscript.require_header;
        let mut document = match parse_header_block(&text, require_header) {
            Ok(parsed) => {
                let offset = parsed.body_start_line - 1;
                issues.merge(parsed.issues);

                let appendix = parse_comment_appendix(&parsed.body);
                issues.merge(appendix.issues.clone().offset_lines(offset));

                let (meta, meta_issues) = DocumentMeta::from_header(parsed.header);
                issues.merge(meta_issues);
                issues.merge(self.fields.check(&meta));

                let (references, reference_issues) = extract_references(&meta, &self.catalog);
                issues.merge(reference_issues);
                let prose = appendix.mask_appendix(&parsed.body);
                issues.merge(scan_inline_identifiers(&prose, &self.catalog).offset_lines(offset));
                issues.merge(self.grouping.check(&meta));

                Document {
                    path: rel.clone(),
                    title: String::new(),
                    order,
                    meta,
                    word_count: count_words(&appendix.body),
                    body: appendix.body,
                    comments: appendix.threads,
                    references,
                }
            }
            Err(error) => {
                issues.error_at(IssueCategory::Structure, 1, error.to_string());
                Document {
                    path: rel.clone(),
                    title: String::new(),
                    order,
                    meta: DocumentMeta::default(),
                    word_count: count_words(&text),
                    body: text,
                    comments: Vec::new(),
                    references: Vec::new(),
                }
            }
        };
        document.title = document
            .meta
            .title
            .clone()
            .unwrap_or_else(|| title_from_file_name(&file_name));

        tracing::debug!(
            file = %rel,
            words = document.word_count,
            comments = document.comments.len(),
            "parsed manuscript file"
        );
        (Some(document), issues.in_file(&rel))
    }

    /// Warn about references that no catalog notes file mentions.
    fn check_known_references(&self, documents: &[Document]) -> IssueLog {
        let mut issues = IssueLog::new();
        if self.catalog.is_empty() {
            return issues;
        }

        let mut known = HashSet::new();
        for category in &self.catalog.categories {
            let path = self.ctx.spine_dir().join(&category.notes_file);
            match fs::read_to_string(&path) {
                Ok(notes) => known.extend(category.find_ids(&notes).map(String::from)),
                Err(error) => {
                    tracing::warn!(path = %path.display(), %error, "catalog notes file unavailable");
                    issues.warning(
                        IssueCategory::Continuity,
                        format!(
                            "Notes file {SPINE_DIR}/{} for category '{}' could not be read",
                            category.notes_file, category.key
                        ),
                    );
                }
            }
        }

        for document in documents {
            for reference in &document.references {
                if !known.contains(reference) {
                    issues.push(
                        Issue::warning(
                            IssueCategory::Continuity,
                            format!("Reference '{reference}' is not listed in any catalog notes file"),
                        )
                        .in_file(&document.path),
                    );
                }
            }
        }
        issues
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn order_key(file_name: &str) -> (Option<u32>, IssueLog) {
    let mut issues = IssueLog::new();
    let Some(digits) = ORDER_PREFIX
        .captures(file_name)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
    else {
        issues.error(
            IssueCategory::Ordering,
            format!("File name '{file_name}' needs a numeric order prefix such as '100-'"),
        );
        return (None, issues);
    };

    if digits.len() != 3 {
        issues.warning(
            IssueCategory::Ordering,
            format!("Order prefix '{digits}' should be three digits"),
        );
    }
    match digits.parse::<u32>() {
        Ok(order) => (Some(order), issues),
        Err(_) => {
            issues.error(
                IssueCategory::Ordering,
                format!("Order prefix '{digits}' is out of range"),
            );
            (None, issues)
        }
    }
}

/// One error per order key shared by several documents.
fn duplicate_orders(documents: &[Document]) -> IssueLog {
    let mut by_order: BTreeMap<u32, Vec<&str>> = BTreeMap::new();
    for document in documents {
        if let Some(order) = document.order {
            by_order.entry(order).or_default().push(&document.path);
        }
    }

    let mut issues = IssueLog::new();
    for (order, mut paths) in by_order {
        if paths.len() > 1 {
            paths.sort_unstable();
            issues.error(
                IssueCategory::Ordering,
                format!("Duplicate order key {order}: {}", paths.join(", ")),
            );
        }
    }
    issues
}

/// `120-the-long_road.md` -> `The Long Road`.
fn title_from_file_name(file_name: &str) -> String {
    let stem = file_name.strip_suffix(".md").unwrap_or(file_name);
    let stem = ORDER_PREFIX
        .find(stem)
        .map_or(stem, |prefix| &stem[prefix.end()..]);

    stem.split(['-', '_'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn count_words(body: &str) -> usize {
    body.split_whitespace().count()
}
