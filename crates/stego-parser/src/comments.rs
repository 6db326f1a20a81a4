//! Comment appendix parser.
//!
//! Grammar, embedded at the end of a document body:
//!
//! ```text
//! <!-- stego-comments:start -->
//! ### CMT-0001
//! <!-- meta64: <base64url(JSON)> -->
//! > _<timestamp> | <author>_
//! >
//! > <message text, one or more lines>
//! <!-- stego-comments:end -->
//! ```
//!
//! The JSON payload accepts `status` (`open` | `resolved`), `anchor`,
//! `paragraph_index`, `signature`, and `excerpt`. Each identifier carries
//! exactly one message; a reply needs a new identifier.

use std::collections::HashSet;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::Value;
use stego_core::{
    CommentMessage, CommentMeta, CommentStatus, CommentThread, IssueCategory, IssueLog,
};

use crate::lines::{AppendixLine, classify_appendix_line};

pub const COMMENTS_START: &str = "<!-- stego-comments:start -->";
pub const COMMENTS_END: &str = "<!-- stego-comments:end -->";

const META_FIELDS: &[&str] = &["status", "anchor", "paragraph_index", "signature", "excerpt"];

/// Result of splitting an appendix off a body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAppendix {
    /// Body without the appendix; unchanged when no appendix was removed.
    pub body: String,
    pub threads: Vec<CommentThread>,
    pub has_appendix: bool,
    /// 0-based line indices of the start and end markers in the input body.
    pub span: Option<(usize, usize)>,
    /// Line numbers are 1-based within the input body.
    pub issues: IssueLog,
}

impl ParsedAppendix {
    fn untouched(body: &str, issues: IssueLog) -> Self {
        Self {
            body: body.to_string(),
            threads: Vec::new(),
            has_appendix: false,
            span: None,
            issues,
        }
    }

    /// `body` (the text this appendix was parsed from) with the appendix
    /// lines blanked. Line numbers match the input body.
    #[must_use]
    pub fn mask_appendix(&self, body: &str) -> String {
        let Some((start, end)) = self.span else {
            return body.to_string();
        };
        body.lines()
            .enumerate()
            .map(|(index, line)| if (start..=end).contains(&index) { "" } else { line })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Locate, decode, and strip the comment appendix of `body`.
///
/// Marker faults (duplicates, a missing partner, wrong order) leave the body
/// unchanged and yield no threads.
#[must_use]
pub fn parse_comment_appendix(body: &str) -> ParsedAppendix {
    let lines: Vec<&str> = body.lines().collect();
    let starts = marker_positions(&lines, COMMENTS_START);
    let ends = marker_positions(&lines, COMMENTS_END);

    if starts.is_empty() && ends.is_empty() {
        return ParsedAppendix::untouched(body, IssueLog::new());
    }

    let mut issues = IssueLog::new();
    if starts.len() != 1 || ends.len() != 1 {
        issues.error(
            IssueCategory::Structure,
            format!(
                "Comment appendix must have exactly one start and one end marker (found {} start, {} end)",
                starts.len(),
                ends.len()
            ),
        );
        return ParsedAppendix::untouched(body, issues);
    }

    let (start, end) = (starts[0], ends[0]);
    if end <= start {
        issues.error_at(
            IssueCategory::Structure,
            end + 1,
            "Comment appendix end marker appears before its start marker",
        );
        return ParsedAppendix::untouched(body, issues);
    }

    let threads = parse_threads(&lines[start + 1..end], start + 1, &mut issues);

    ParsedAppendix {
        body: strip_span(&lines, start, end),
        threads,
        has_appendix: true,
        span: Some((start, end)),
        issues,
    }
}

fn marker_positions(lines: &[&str], marker: &str) -> Vec<usize> {
    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| line.trim() == marker)
        .map(|(index, _)| index)
        .collect()
}

/// Remove `lines[start..=end]` plus one adjacent blank line, then trim
/// trailing blank lines.
fn strip_span(lines: &[&str], start: usize, end: usize) -> String {
    let mut before = &lines[..start];
    let mut after = &lines[end + 1..];
    if before.last().is_some_and(|line| line.trim().is_empty()) {
        before = &before[..before.len() - 1];
    } else if after.first().is_some_and(|line| line.trim().is_empty()) {
        after = &after[1..];
    }

    let mut kept: Vec<&str> = before.iter().chain(after.iter()).copied().collect();
    while kept.last().is_some_and(|line| line.trim().is_empty()) {
        kept.pop();
    }

    if kept.is_empty() {
        return String::new();
    }
    let mut out = kept.join("\n");
    out.push('\n');
    out
}

// ---------------------------------------------------------------------------
// Thread state machine
// ---------------------------------------------------------------------------

enum ThreadState {
    /// Heading seen; the next non-blank line must be the meta line.
    AwaitingMeta,
    /// Before the message header.
    AwaitingMessage,
    InMessage,
    /// A second message block was found; the rest of the thread is ignored.
    Overflow,
}

struct ThreadBuilder<'a> {
    id: &'a str,
    heading_line: usize,
    state: ThreadState,
    meta: CommentMeta,
    header: Option<(&'a str, &'a str)>,
    message_lines: Vec<&'a str>,
}

impl<'a> ThreadBuilder<'a> {
    const fn new(id: &'a str, heading_line: usize) -> Self {
        Self {
            id,
            heading_line,
            state: ThreadState::AwaitingMeta,
            meta: CommentMeta {
                status: CommentStatus::Open,
                anchor: None,
                paragraph_index: None,
                signature: None,
                excerpt: None,
            },
            header: None,
            message_lines: Vec::new(),
        }
    }

    fn feed(&mut self, line: AppendixLine<'a>, line_no: usize, issues: &mut IssueLog) {
        if matches!(line, AppendixLine::Blank) {
            return;
        }

        if matches!(self.state, ThreadState::AwaitingMeta) {
            self.state = ThreadState::AwaitingMessage;
            if let AppendixLine::Meta(payload) = line {
                self.meta = decode_meta(payload, self.id, line_no, issues);
                return;
            }
            issues.error_at(
                IssueCategory::Comments,
                line_no,
                format!(
                    "Comment {} is missing its '<!-- meta64: ... -->' line; treating it as open",
                    self.id
                ),
            );
        }

        if matches!(self.state, ThreadState::Overflow) {
            return;
        }

        match line {
            AppendixLine::Blank | AppendixLine::ThreadHeading(_) => {}
            AppendixLine::MessageHeader { timestamp, author } => {
                if self.header.is_some() {
                    issues.error_at(
                        IssueCategory::Comments,
                        line_no,
                        format!(
                            "Comment {} has multiple message blocks; replies need a new comment id",
                            self.id
                        ),
                    );
                    self.state = ThreadState::Overflow;
                } else {
                    self.header = Some((timestamp, author));
                    self.state = ThreadState::InMessage;
                }
            }
            AppendixLine::Quote(text) => {
                if matches!(self.state, ThreadState::InMessage) {
                    self.message_lines.push(text);
                } else {
                    issues.error_at(
                        IssueCategory::Comments,
                        line_no,
                        format!(
                            "Comment {} has message text before its '> _timestamp | author_' header",
                            self.id
                        ),
                    );
                }
            }
            AppendixLine::Meta(_) => issues.error_at(
                IssueCategory::Comments,
                line_no,
                format!("Comment {} has more than one meta64 line", self.id),
            ),
            AppendixLine::BadHeading(text) => issues.error_at(
                IssueCategory::Comments,
                line_no,
                format!("Invalid comment heading '{text}'; expected '### CMT-NNNN'"),
            ),
            AppendixLine::Other(text) => issues.error_at(
                IssueCategory::Comments,
                line_no,
                format!("Unexpected line in comment {}: '{text}'", self.id),
            ),
        }
    }

    fn finish(self, issues: &mut IssueLog) -> CommentThread {
        let mut messages = Vec::new();
        match self.header {
            Some((timestamp, author)) => {
                let text = self.message_lines.join("\n").trim().to_string();
                if text.is_empty() {
                    issues.error_at(
                        IssueCategory::Comments,
                        self.heading_line,
                        format!("Comment {} has an empty message", self.id),
                    );
                }
                messages.push(CommentMessage {
                    timestamp: timestamp.to_string(),
                    author: author.to_string(),
                    text,
                });
            }
            None => issues.error_at(
                IssueCategory::Comments,
                self.heading_line,
                format!("Comment {} has no message", self.id),
            ),
        }

        CommentThread {
            id: self.id.to_string(),
            meta: self.meta,
            messages,
        }
    }
}

/// `first_line_index` is the 0-based body index of `lines[0]`.
fn parse_threads(
    lines: &[&str],
    first_line_index: usize,
    issues: &mut IssueLog,
) -> Vec<CommentThread> {
    let mut threads = Vec::new();
    let mut seen = HashSet::new();
    let mut current: Option<ThreadBuilder<'_>> = None;

    for (offset, raw) in lines.iter().enumerate() {
        let line_no = first_line_index + offset + 1;
        let line = classify_appendix_line(raw);

        if let AppendixLine::ThreadHeading(id) = line {
            if let Some(builder) = current.take() {
                threads.push(builder.finish(issues));
            }
            if !seen.insert(id) {
                issues.error_at(
                    IssueCategory::Comments,
                    line_no,
                    format!("Duplicate comment id {id}"),
                );
            }
            current = Some(ThreadBuilder::new(id, line_no));
            continue;
        }

        match current.as_mut() {
            Some(builder) => builder.feed(line, line_no, issues),
            None if matches!(line, AppendixLine::Blank) => {}
            None => issues.error_at(
                IssueCategory::Comments,
                line_no,
                "Content in comment appendix outside any '### CMT-NNNN' thread",
            ),
        }
    }

    if let Some(builder) = current {
        threads.push(builder.finish(issues));
    }
    threads
}

// ---------------------------------------------------------------------------
// meta64 payload
// ---------------------------------------------------------------------------

fn decode_meta(payload: &str, id: &str, line_no: usize, issues: &mut IssueLog) -> CommentMeta {
    let mut meta = CommentMeta::default();
    let mut fail = |message: String| issues.error_at(IssueCategory::Comments, line_no, message);

    let bytes = match URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')) {
        Ok(bytes) => bytes,
        Err(error) => {
            fail(format!("Comment {id} has an undecodable meta64 payload: {error}"));
            return meta;
        }
    };
    let value: Value = match serde_json::from_slice(&bytes) {
        Ok(value) => value,
        Err(error) => {
            fail(format!("Comment {id} meta64 payload is not valid JSON: {error}"));
            return meta;
        }
    };
    let Value::Object(fields) = value else {
        fail(format!("Comment {id} meta64 payload must be a JSON object"));
        return meta;
    };

    for key in fields.keys() {
        if !META_FIELDS.contains(&key.as_str()) {
            fail(format!("Comment {id} meta64 has unknown field '{key}'"));
        }
    }

    match fields.get("status") {
        Some(Value::String(status)) => match CommentStatus::parse(status) {
            Some(parsed) => meta.status = parsed,
            None => fail(format!(
                "Comment {id} has invalid status '{status}'; expected 'open' or 'resolved'"
            )),
        },
        Some(_) => fail(format!("Comment {id} status must be a string")),
        None => fail(format!("Comment {id} meta64 is missing 'status'")),
    }

    let mut text_field = |name: &str| match fields.get(name) {
        None => None,
        Some(Value::String(text)) => Some(text.clone()),
        Some(_) => {
            fail(format!("Comment {id} meta64 field '{name}' must be a string"));
            None
        }
    };
    meta.anchor = text_field("anchor");
    meta.signature = text_field("signature");
    meta.excerpt = text_field("excerpt");

    meta.paragraph_index = match fields.get("paragraph_index") {
        None => None,
        Some(value) => {
            let index = value.as_u64();
            if index.is_none() {
                issues.error_at(
                    IssueCategory::Comments,
                    line_no,
                    format!("Comment {id} meta64 field 'paragraph_index' must be a non-negative integer"),
                );
            }
            index
        }
    };

    meta
}

fn encode_meta(meta: &CommentMeta) -> String {
    let json = serde_json::to_string(meta).unwrap_or_else(|_| String::from("{}"));
    URL_SAFE_NO_PAD.encode(json)
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Render threads in appendix grammar, markers included, without a trailing
/// newline.
#[must_use]
pub fn render_appendix(threads: &[CommentThread]) -> String {
    let mut lines = vec![COMMENTS_START.to_string()];
    for (index, thread) in threads.iter().enumerate() {
        if index > 0 {
            lines.push(String::new());
        }
        lines.push(format!("### {}", thread.id));
        lines.push(format!("<!-- meta64: {} -->", encode_meta(&thread.meta)));
        for message in &thread.messages {
            lines.push(format!("> _{} | {}_", message.timestamp, message.author));
            lines.push(">".to_string());
            for text in message.text.lines() {
                if text.is_empty() {
                    lines.push(">".to_string());
                } else {
                    lines.push(format!("> {text}"));
                }
            }
        }
    }
    lines.push(COMMENTS_END.to_string());
    lines.join("\n")
}

/// Append an appendix for `threads` to `body`, separated by one blank line.
#[must_use]
pub fn attach_appendix(body: &str, threads: &[CommentThread]) -> String {
    let base = body.trim_end();
    let mut out = String::with_capacity(base.len() + 256);
    out.push_str(base);
    if threads.is_empty() {
        if !out.is_empty() {
            out.push('\n');
        }
        return out;
    }
    if !out.is_empty() {
        out.push_str("\n\n");
    }
    out.push_str(&render_appendix(threads));
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn meta64(json: &str) -> String {
        URL_SAFE_NO_PAD.encode(json)
    }

    fn thread_block(id: &str, json: &str, message: &str) -> String {
        format!(
            "### {id}\n<!-- meta64: {} -->\n> _2026-03-01T09:00:00Z | Editor_\n>\n> {message}\n",
            meta64(json)
        )
    }

    #[test]
    fn body_without_markers_is_unchanged() {
        let body = "Prose.\n\nMore prose.\n";
        let parsed = parse_comment_appendix(body);
        assert!(!parsed.has_appendix);
        assert_eq!(parsed.body, body);
        assert!(parsed.issues.is_empty());
    }

    #[test]
    fn parses_single_thread_and_strips_appendix() {
        let body = format!(
            "Prose line.\n\n{COMMENTS_START}\n{}{COMMENTS_END}\n",
            thread_block(
                "CMT-0001",
                r#"{"status":"resolved","anchor":"p1","paragraph_index":2}"#,
                "Tighten this."
            )
        );

        let parsed = parse_comment_appendix(&body);
        assert!(parsed.issues.is_empty(), "{:?}", parsed.issues);
        assert_eq!(parsed.body, "Prose line.\n");
        assert_eq!(parsed.threads.len(), 1);

        let thread = &parsed.threads[0];
        assert_eq!(thread.id, "CMT-0001");
        assert!(thread.is_resolved());
        assert_eq!(thread.meta.anchor.as_deref(), Some("p1"));
        assert_eq!(thread.meta.paragraph_index, Some(2));
        assert_eq!(thread.messages[0].author, "Editor");
        assert_eq!(thread.messages[0].text, "Tighten this.");
    }

    #[test]
    fn multi_line_message_is_joined() {
        let body = format!(
            "{COMMENTS_START}\n### CMT-0002\n<!-- meta64: {} -->\n> _t1 | Ana_\n>\n> First line.\n> Second line.\n{COMMENTS_END}\n",
            meta64(r#"{"status":"open"}"#)
        );
        let parsed = parse_comment_appendix(&body);
        assert!(parsed.issues.is_empty());
        assert_eq!(parsed.threads[0].messages[0].text, "First line.\nSecond line.");
        assert_eq!(parsed.body, "");
    }

    #[test]
    fn duplicate_start_marker_leaves_body_unchanged() {
        let body = format!("Prose\n{COMMENTS_START}\n{COMMENTS_START}\n{COMMENTS_END}\n");
        let parsed = parse_comment_appendix(&body);
        assert!(!parsed.has_appendix);
        assert_eq!(parsed.body, body);
        assert_eq!(parsed.issues.error_count(), 1);
        assert_eq!(parsed.issues.as_slice()[0].category, IssueCategory::Structure);
    }

    #[test]
    fn lone_end_marker_is_structural_error() {
        let body = format!("Prose\n{COMMENTS_END}\n");
        let parsed = parse_comment_appendix(&body);
        assert_eq!(parsed.issues.error_count(), 1);
        assert_eq!(parsed.body, body);
    }

    #[test]
    fn end_before_start_is_structural_error() {
        let body = format!("{COMMENTS_END}\n{COMMENTS_START}\n");
        let parsed = parse_comment_appendix(&body);
        assert!(!parsed.has_appendix);
        assert_eq!(parsed.issues.as_slice()[0].line, Some(1));
    }

    #[test]
    fn invalid_status_is_error_and_thread_stays_open() {
        let body = format!(
            "{COMMENTS_START}\n{}{COMMENTS_END}\n",
            thread_block("CMT-0003", r#"{"status":"done"}"#, "Check")
        );
        let parsed = parse_comment_appendix(&body);
        assert_eq!(parsed.issues.error_count(), 1);
        assert!(!parsed.threads[0].is_resolved());
    }

    #[test]
    fn unknown_meta_field_is_rejected() {
        let body = format!(
            "{COMMENTS_START}\n{}{COMMENTS_END}\n",
            thread_block("CMT-0004", r#"{"status":"open","color":"red"}"#, "Check")
        );
        let parsed = parse_comment_appendix(&body);
        assert_eq!(parsed.issues.error_count(), 1);
        assert!(parsed.issues.as_slice()[0].message.contains("color"));
    }

    #[test]
    fn missing_meta_line_is_error_but_thread_is_emitted() {
        let body = format!(
            "{COMMENTS_START}\n### CMT-0005\n> _t | Bo_\n>\n> Text\n{COMMENTS_END}\n"
        );
        let parsed = parse_comment_appendix(&body);
        assert_eq!(parsed.issues.error_count(), 1);
        assert_eq!(parsed.issues.as_slice()[0].line, Some(3));
        assert_eq!(parsed.threads.len(), 1);
        assert!(!parsed.threads[0].is_resolved());
        assert_eq!(parsed.threads[0].messages[0].text, "Text");
    }

    #[test]
    fn thread_without_message_is_error_but_emitted() {
        let body = format!(
            "{COMMENTS_START}\n### CMT-0006\n<!-- meta64: {} -->\n{COMMENTS_END}\n",
            meta64(r#"{"status":"resolved"}"#)
        );
        let parsed = parse_comment_appendix(&body);
        assert_eq!(parsed.issues.error_count(), 1);
        assert_eq!(parsed.threads.len(), 1);
        assert!(parsed.threads[0].messages.is_empty());
    }

    #[test]
    fn second_message_block_is_one_error_and_first_message_kept() {
        let body = format!(
            "{COMMENTS_START}\n### CMT-0001\n<!-- meta64: {} -->\n> _t1 | Ana_\n>\n> First.\n> _t2 | Bo_\n>\n> Reply.\n{COMMENTS_END}\n",
            meta64(r#"{"status":"open"}"#)
        );
        let parsed = parse_comment_appendix(&body);

        let multiple: Vec<_> = parsed
            .issues
            .iter()
            .filter(|issue| issue.message.contains("multiple message blocks"))
            .collect();
        assert_eq!(multiple.len(), 1);
        assert_eq!(parsed.issues.len(), 1);
        assert_eq!(parsed.threads.len(), 1);
        assert_eq!(parsed.threads[0].messages.len(), 1);
        assert_eq!(parsed.threads[0].messages[0].text, "First.");
    }

    #[test]
    fn duplicate_ids_are_reported() {
        let block = thread_block("CMT-0007", r#"{"status":"open"}"#, "x");
        let body = format!("{COMMENTS_START}\n{block}\n{block}{COMMENTS_END}\n");
        let parsed = parse_comment_appendix(&body);
        assert_eq!(parsed.threads.len(), 2);
        assert_eq!(parsed.issues.error_count(), 1);
    }

    #[test]
    fn stray_content_before_first_thread_is_reported() {
        let body = format!(
            "{COMMENTS_START}\nloose note\n{}{COMMENTS_END}\n",
            thread_block("CMT-0008", r#"{"status":"open"}"#, "x")
        );
        let parsed = parse_comment_appendix(&body);
        assert_eq!(parsed.issues.error_count(), 1);
        assert_eq!(parsed.issues.as_slice()[0].line, Some(2));
    }

    #[test]
    fn mask_keeps_line_positions_of_trailing_prose() {
        let body = format!(
            "Before.\n\n{COMMENTS_START}\n{}{COMMENTS_END}\nAfter.\n",
            thread_block("CMT-0001", r#"{"status":"open"}"#, "Note")
        );
        let parsed = parse_comment_appendix(&body);
        assert_eq!(parsed.span, Some((2, 8)));

        let masked = parsed.mask_appendix(&body);
        let lines: Vec<&str> = masked.lines().collect();
        assert_eq!(lines.len(), body.lines().count());
        assert_eq!(lines[0], "Before.");
        assert_eq!(lines[9], "After.");
        assert!(lines[2..=8].iter().all(|line| line.is_empty()));
    }

    #[test]
    fn non_ascii_digit_id_is_not_a_thread() {
        let body = format!(
            "{COMMENTS_START}\n### CMT-١٢٣٤\n<!-- meta64: {} -->\n{COMMENTS_END}\n",
            meta64(r#"{"status":"open"}"#)
        );
        let parsed = parse_comment_appendix(&body);
        assert!(parsed.threads.is_empty());
        assert_eq!(parsed.issues.as_slice()[0].line, Some(2));
    }

    #[test]
    fn strip_then_reattach_reproduces_body() {
        let original = format!(
            "First paragraph.\n\nSecond paragraph.\n\n{COMMENTS_START}\n{}{COMMENTS_END}\n",
            thread_block("CMT-0001", r#"{"status":"open","excerpt":"Second"}"#, "Why?")
        );

        let first = parse_comment_appendix(&original);
        let rebuilt = attach_appendix(&first.body, &first.threads);
        let second = parse_comment_appendix(&rebuilt);

        assert!(second.issues.is_empty());
        assert_eq!(second.body, first.body);
        assert_eq!(second.threads, first.threads);
    }
}
