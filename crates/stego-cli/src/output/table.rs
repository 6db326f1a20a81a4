use stego_core::{Issue, Severity};

#[derive(Clone, Copy, Debug)]
pub struct TableOptions {
    pub max_width: Option<usize>,
    pub color: bool,
}

const MIN_COLUMN: usize = 6;
const SEPARATOR: &str = "  ";

/// Render an aligned table. Only the last column shrinks to fit `max_width`.
#[must_use]
pub fn render_entity_table(
    headers: &[&str],
    rows: &[Vec<String>],
    options: TableOptions,
) -> String {
    let mut widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            rows.iter()
                .filter_map(|row| row.get(index))
                .map(|cell| cell.chars().count())
                .chain([header.chars().count(), MIN_COLUMN])
                .max()
                .unwrap_or(MIN_COLUMN)
        })
        .collect();

    if let (Some(max_width), Some((last, leading))) = (options.max_width, widths.split_last_mut()) {
        let used = leading.iter().sum::<usize>() + leading.len() * SEPARATOR.len();
        *last = (*last).min(max_width.saturating_sub(used)).max(MIN_COLUMN);
    }

    let header_line = render_row(&widths, headers.iter().copied(), false);
    let divider = "-".repeat(header_line.chars().count());
    let mut lines = vec![header_line, divider];
    for row in rows {
        let cells = (0..widths.len()).map(|index| row.get(index).map_or("-", String::as_str));
        lines.push(render_row(&widths, cells, options.color));
    }
    lines.join("\n")
}

fn render_row<'a>(widths: &[usize], cells: impl Iterator<Item = &'a str>, colored: bool) -> String {
    let line = widths
        .iter()
        .zip(cells)
        .map(|(width, cell)| {
            let text = truncate_text(cell, *width);
            let pad = width.saturating_sub(text.chars().count());
            let text = if colored { colorize(&text) } else { text };
            format!("{text}{}", " ".repeat(pad))
        })
        .collect::<Vec<_>>()
        .join(SEPARATOR);
    line.trim_end().to_string()
}

/// One row per issue: severity, category, location, message.
#[must_use]
pub fn render_issue_table(issues: &[Issue], options: TableOptions) -> String {
    let rows = issues
        .iter()
        .map(|issue| {
            let location = match (&issue.file, issue.line) {
                (Some(file), Some(line)) => format!("{file}:{line}"),
                (Some(file), None) => file.clone(),
                (None, Some(line)) => format!("line {line}"),
                (None, None) => "-".to_string(),
            };
            vec![
                issue.severity.as_str().to_string(),
                issue.category.as_str().to_string(),
                location,
                issue.message.clone(),
            ]
        })
        .collect::<Vec<_>>();
    render_entity_table(&["severity", "category", "location", "message"], &rows, options)
}

fn truncate_text(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    if width <= 1 {
        return "…".to_string();
    }
    let mut out: String = value.chars().take(width - 1).collect();
    out.push('…');
    out
}

fn colorize(value: &str) -> String {
    let code = match value {
        v if v == Severity::Error.as_str() || v == "open" => "31",
        v if v == Severity::Warning.as_str() => "33",
        "resolved" => "32",
        _ => return value.to_string(),
    };
    format!("\u{1b}[{code}m{value}\u{1b}[0m")
}
