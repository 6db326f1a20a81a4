//! Line classification shared by the header and appendix state machines.

use std::sync::LazyLock;

use regex::Regex;

static THREAD_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^###\s+(CMT-[0-9]{4})\s*$").expect("valid thread heading regex")
});

static META_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^<!--\s*meta64:\s*(\S*)\s*-->$").expect("valid meta line regex")
});

static MESSAGE_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^>\s*_(.+?)\s*\|\s*(.+?)_\s*$").expect("valid message header regex")
});

// ---------------------------------------------------------------------------
// Header block lines
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderLine<'a> {
    Blank,
    Comment,
    /// `key: value` at zero indent; `value` is trimmed and may be empty.
    Entry { key: &'a str, value: &'a str },
    /// Indented `- value`.
    ListItem(&'a str),
    /// Indented line that is not a list item.
    Indented(&'a str),
    /// Zero-indent line that is not a valid entry.
    Malformed(&'a str),
}

pub fn classify_header_line(line: &str) -> HeaderLine<'_> {
    let line = line.trim_end();
    if line.trim().is_empty() {
        return HeaderLine::Blank;
    }

    if line.starts_with(char::is_whitespace) {
        let content = line.trim_start();
        if content == "-" {
            return HeaderLine::ListItem("");
        }
        return content
            .strip_prefix("- ")
            .map_or(HeaderLine::Indented(content), |item| {
                HeaderLine::ListItem(item.trim())
            });
    }

    if line.starts_with('#') {
        return HeaderLine::Comment;
    }

    let Some((key, value)) = line.split_once(':') else {
        return HeaderLine::Malformed(line);
    };
    let key = key.trim_end();
    if is_valid_key(key) {
        HeaderLine::Entry {
            key,
            value: value.trim(),
        }
    } else {
        HeaderLine::Malformed(line)
    }
}

pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-')
}

// ---------------------------------------------------------------------------
// Comment appendix lines
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendixLine<'a> {
    Blank,
    /// `### CMT-0001`
    ThreadHeading(&'a str),
    /// Any other `###` heading.
    BadHeading(&'a str),
    /// `<!-- meta64: <payload> -->`
    Meta(&'a str),
    /// `> _timestamp | author_`
    MessageHeader { timestamp: &'a str, author: &'a str },
    /// `> text` (text has the marker and one following space removed)
    Quote(&'a str),
    Other(&'a str),
}

pub fn classify_appendix_line(line: &str) -> AppendixLine<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return AppendixLine::Blank;
    }

    if let Some(captures) = THREAD_HEADING.captures(trimmed) {
        if let Some(id) = captures.get(1) {
            return AppendixLine::ThreadHeading(id.as_str());
        }
    }
    if trimmed.starts_with("###") {
        return AppendixLine::BadHeading(trimmed);
    }

    if let Some(captures) = META_LINE.captures(trimmed) {
        return AppendixLine::Meta(captures.get(1).map_or("", |m| m.as_str()));
    }

    if let Some(captures) = MESSAGE_HEADER.captures(trimmed) {
        if let (Some(timestamp), Some(author)) = (captures.get(1), captures.get(2)) {
            return AppendixLine::MessageHeader {
                timestamp: timestamp.as_str(),
                author: author.as_str(),
            };
        }
    }

    let without_indent = line.trim_start();
    if let Some(rest) = without_indent.strip_prefix('>') {
        let text = rest.strip_prefix(' ').unwrap_or(rest);
        return AppendixLine::Quote(text.trim_end());
    }

    AppendixLine::Other(trimmed)
}
