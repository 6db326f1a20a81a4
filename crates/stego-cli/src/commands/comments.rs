use std::fs;

use anyhow::Context;
use serde::Serialize;
use stego_core::{CommentThread, Issue};
use stego_engine::ProjectContext;
use stego_parser::{parse_comment_appendix, parse_header_block};

use crate::cli::{GlobalFlags, OutputFormat};
use crate::cli::root_commands::CommentsArgs;
use crate::commands::shared::resolve_input;
use crate::output::{output, table};

const EXCERPT_CHARS: usize = 60;

#[derive(Debug, Serialize)]
pub struct CommentsResponse {
    pub file: String,
    pub threads: Vec<CommentThread>,
    pub issues: Vec<Issue>,
}

/// Flattened thread for table output.
#[derive(Debug, Serialize)]
struct CommentRow {
    id: String,
    status: String,
    author: String,
    timestamp: String,
    message: String,
}

impl From<&CommentThread> for CommentRow {
    fn from(thread: &CommentThread) -> Self {
        let first = thread.messages.first();
        Self {
            id: thread.id.clone(),
            status: thread.meta.status.to_string(),
            author: first.map_or_else(|| "-".to_string(), |m| m.author.clone()),
            timestamp: first.map_or_else(|| "-".to_string(), |m| m.timestamp.clone()),
            message: first.map_or_else(String::new, |m| excerpt(&m.text)),
        }
    }
}

fn excerpt(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= EXCERPT_CHARS {
        return flat;
    }
    let mut out: String = flat.chars().take(EXCERPT_CHARS - 1).collect();
    out.push('…');
    out
}

/// Handle `stego comments <file>`.
pub fn handle(args: &CommentsArgs, ctx: &ProjectContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let path = resolve_input(&args.file, ctx, flags)?;
    let text =
        fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))?;
    let file = ctx.relative_path(&path);

    let parsed = parse_header_block(&text, false).with_context(|| format!("in {file}"))?;
    let offset = parsed.body_start_line - 1;
    let appendix = parse_comment_appendix(&parsed.body);
    let issues = appendix.issues.offset_lines(offset).in_file(&file).into_vec();

    match flags.format {
        OutputFormat::Json | OutputFormat::Raw => output(
            &CommentsResponse {
                file,
                threads: appendix.threads,
                issues,
            },
            flags.format,
        ),
        OutputFormat::Table => {
            let rows: Vec<CommentRow> = appendix.threads.iter().map(CommentRow::from).collect();
            output(&rows, flags.format)?;
            if !issues.is_empty() {
                println!();
                println!(
                    "{}",
                    table::render_issue_table(&issues, crate::output::table_options())
                );
            }
            Ok(())
        }
    }
}
