//! Header block parser.
//!
//! A header block starts at offset 0 with a `---` line and ends at the next
//! line containing only `---`. Between the delimiters each line is a
//! `key: value` pair, or a `key:` followed by indented `- item` lines.
//!
//! Value rules:
//! - `"quoted"` / `'quoted'` is unwrapped literally.
//! - `[a, b]` becomes a list (commas cannot be escaped).
//! - all digits becomes a number, `true`/`false` a boolean.
//! - anything else is a string.

use stego_core::{HeaderMap, HeaderValue, IssueCategory, IssueLog};

use crate::error::HeaderError;
use crate::lines::{HeaderLine, classify_header_line};

pub const HEADER_DELIMITER: &str = "---";

/// Result of splitting a raw document into header and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedHeader {
    pub header: HeaderMap,
    pub body: String,
    pub has_header: bool,
    /// 1-based line number of the first body line in the source text.
    pub body_start_line: usize,
    /// Line-level faults; line numbers refer to the source text.
    pub issues: IssueLog,
}

/// Parse the header block at the top of `text`.
///
/// Without an opening delimiter the whole text is the body; that is an error
/// only when `required` is set. An opening delimiter without a closing one
/// fails with [`HeaderError::Unterminated`].
pub fn parse_header_block(text: &str, required: bool) -> Result<ParsedHeader, HeaderError> {
    let source = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut segments = source.split_inclusive('\n');

    let opens = segments
        .next()
        .is_some_and(|first| first.trim_end() == HEADER_DELIMITER);
    if !opens {
        let mut issues = IssueLog::new();
        if required {
            issues.error_at(
                IssueCategory::Structure,
                1,
                "Missing metadata header; file must start with '---'",
            );
        }
        return Ok(ParsedHeader {
            header: HeaderMap::new(),
            body: text.to_string(),
            has_header: false,
            body_start_line: 1,
            issues,
        });
    }

    let mut offset = source.find('\n').map_or(source.len(), |i| i + 1);
    let mut header_lines = Vec::new();
    let mut closing_line = None;
    for (index, segment) in segments.enumerate() {
        let line_no = index + 2;
        offset += segment.len();
        if segment.trim_end() == HEADER_DELIMITER {
            closing_line = Some(line_no);
            break;
        }
        header_lines.push((line_no, segment));
    }

    let Some(closing_line) = closing_line else {
        return Err(HeaderError::Unterminated);
    };

    let (header, issues) = parse_header_lines(&header_lines);
    Ok(ParsedHeader {
        header,
        body: source[offset..].to_string(),
        has_header: true,
        body_start_line: closing_line + 1,
        issues,
    })
}

enum State<'a> {
    TopLevel,
    BlockList {
        key: &'a str,
        items: Vec<String>,
        duplicate: bool,
    },
}

fn parse_header_lines<'a>(lines: &[(usize, &'a str)]) -> (HeaderMap, IssueLog) {
    let mut header = HeaderMap::new();
    let mut issues = IssueLog::new();
    let mut state = State::TopLevel;

    for &(line_no, raw) in lines {
        let line = classify_header_line(raw);

        if let State::BlockList { key, items, .. } = &mut state {
            match line {
                HeaderLine::Blank => continue,
                HeaderLine::ListItem(item) => {
                    items.push(unquote(item).to_string());
                    continue;
                }
                HeaderLine::Indented(_) => {
                    issues.error_at(
                        IssueCategory::Metadata,
                        line_no,
                        format!("Invalid list item in '{key}'; expected '- value'"),
                    );
                    continue;
                }
                HeaderLine::Comment | HeaderLine::Entry { .. } | HeaderLine::Malformed(_) => {
                    finish_list(&mut state, &mut header);
                }
            }
        }

        match line {
            HeaderLine::Blank | HeaderLine::Comment => {}
            HeaderLine::Entry { key, value } => {
                let duplicate = header.contains_key(key);
                if duplicate {
                    issues.error_at(
                        IssueCategory::Metadata,
                        line_no,
                        format!("Duplicate metadata key '{key}'"),
                    );
                }
                if value.is_empty() {
                    state = State::BlockList {
                        key,
                        items: Vec::new(),
                        duplicate,
                    };
                } else if !duplicate {
                    header.insert(key, parse_scalar(value));
                }
            }
            HeaderLine::ListItem(_) => issues.error_at(
                IssueCategory::Metadata,
                line_no,
                "Unexpected list item outside a list field",
            ),
            HeaderLine::Indented(_) => issues.error_at(
                IssueCategory::Metadata,
                line_no,
                "Unexpected indented line in metadata header",
            ),
            HeaderLine::Malformed(text) => issues.error_at(
                IssueCategory::Metadata,
                line_no,
                format!("Invalid metadata line '{text}'; expected 'key: value'"),
            ),
        }
    }
    finish_list(&mut state, &mut header);

    (header, issues)
}

fn finish_list(state: &mut State<'_>, header: &mut HeaderMap) {
    if let State::BlockList {
        key,
        items,
        duplicate,
    } = std::mem::replace(state, State::TopLevel)
    {
        if duplicate {
            return;
        }
        // A bare `key:` with no items is an empty string, not an empty list.
        let value = if items.is_empty() {
            HeaderValue::String(String::new())
        } else {
            HeaderValue::List(items)
        };
        header.insert(key, value);
    }
}

/// Parse an inline header value.
#[must_use]
pub fn parse_scalar(raw: &str) -> HeaderValue {
    let raw = raw.trim();
    if is_quoted(raw) {
        return HeaderValue::String(raw[1..raw.len() - 1].to_string());
    }

    if let Some(inner) = raw.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
        let items = inner
            .split(',')
            .map(|item| unquote(item.trim()))
            .filter(|item| !item.is_empty())
            .map(String::from)
            .collect();
        return HeaderValue::List(items);
    }

    if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(number) = raw.parse::<u64>() {
            return HeaderValue::Number(number);
        }
    }

    match raw {
        "true" => HeaderValue::Bool(true),
        "false" => HeaderValue::Bool(false),
        _ => HeaderValue::String(raw.to_string()),
    }
}

fn is_quoted(raw: &str) -> bool {
    raw.len() >= 2
        && ((raw.starts_with('"') && raw.ends_with('"'))
            || (raw.starts_with('\'') && raw.ends_with('\'')))
}

fn unquote(raw: &str) -> &str {
    if is_quoted(raw) {
        &raw[1..raw.len() - 1]
    } else {
        raw
    }
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

/// Render a header map as a delimited header block (trailing newline
/// included). Parsing the output yields the same map.
#[must_use]
pub fn format_header_block(header: &HeaderMap) -> String {
    let mut out = String::new();
    out.push_str(HEADER_DELIMITER);
    out.push('\n');
    for (key, value) in header.iter() {
        match value {
            HeaderValue::List(items) if items.is_empty() => {
                out.push_str(key);
                out.push_str(": []\n");
            }
            HeaderValue::List(items) => {
                out.push_str(key);
                out.push_str(":\n");
                for item in items {
                    out.push_str("  - ");
                    out.push_str(&quote_if_needed(item, false));
                    out.push('\n');
                }
            }
            HeaderValue::String(text) => {
                out.push_str(key);
                out.push_str(": ");
                out.push_str(&quote_if_needed(text, true));
                out.push('\n');
            }
            HeaderValue::Number(_) | HeaderValue::Bool(_) => {
                out.push_str(key);
                out.push_str(": ");
                out.push_str(&value.to_string());
                out.push('\n');
            }
        }
    }
    out.push_str(HEADER_DELIMITER);
    out.push('\n');
    out
}

fn quote_if_needed(text: &str, inline: bool) -> String {
    let ambiguous = text.is_empty()
        || text.trim() != text
        || text.starts_with(['"', '\''])
        || text.ends_with(['"', '\''])
        || (inline
            && (text.starts_with('[')
                || text == "true"
                || text == "false"
                || text.bytes().all(|b| b.is_ascii_digit())));
    if !ambiguous {
        return text.to_string();
    }
    if text.contains('"') {
        format!("'{text}'")
    } else {
        format!("\"{text}\"")
    }
}
