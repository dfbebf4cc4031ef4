// Text helpers shared by the renderers

use crate::config::RenderConfig;

/// Strip the common indentation of all non-blank lines, then prefix every
/// line with `spaces` spaces. Whitespace-only lines become just the prefix.
pub fn reindent(text: &str, spaces: usize) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let common = lines
        .iter()
        .filter(|l| !is_blank(l))
        .map(|l| indent_width(l))
        .min()
        .unwrap_or(0);

    let prefix = " ".repeat(spaces);
    lines
        .iter()
        .map(|line| {
            if is_blank(line) {
                prefix.clone()
            } else {
                format!("{}{}", prefix, strip_chars(line, common))
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Drop leading and trailing blank lines
pub fn trim_blank_lines(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let start = lines.iter().position(|l| !is_blank(l));
    let end = lines.iter().rposition(|l| !is_blank(l));
    match (start, end) {
        (Some(start), Some(end)) => lines[start..=end].join("\n"),
        _ => String::new(),
    }
}

/// Escape characters Markdown would read as emphasis
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '*') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Format a docstring for output at the given indentation
///
/// The summary line usually follows the opening quotes directly, so it
/// carries no indentation of its own and is handled apart from the body.
pub fn format_doc(doc: &str, config: &RenderConfig, spaces: usize) -> String {
    if !config.reindent_docs {
        return doc.to_string();
    }

    let (summary, body) = match doc.split_once('\n') {
        Some((summary, body)) => (summary.trim(), Some(body)),
        None => (doc.trim(), None),
    };

    let mut text = if summary.is_empty() {
        " ".repeat(spaces)
    } else {
        format!("{}{}", " ".repeat(spaces), summary)
    };
    if let Some(body) = body {
        text.push('\n');
        text.push_str(&reindent(body, spaces));
    }

    if config.trim_doc_blank_lines {
        trim_blank_lines(&text)
    } else {
        text
    }
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

fn indent_width(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

fn strip_chars(line: &str, count: usize) -> &str {
    match line.char_indices().nth(count) {
        Some((idx, _)) => &line[idx..],
        None => "",
    }
}
