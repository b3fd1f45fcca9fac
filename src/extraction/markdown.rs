//! Markdown rendering and cleanup

use std::panic::{catch_unwind, AssertUnwindSafe};

/// Converts an HTML block to cleaned markdown
///
/// Returns None if the converter panics on pathological markup; callers
/// treat that as the extraction method failing.
pub fn to_markdown(html: &str) -> Option<String> {
    let raw = catch_unwind(AssertUnwindSafe(|| html2md::parse_html(html))).ok()?;
    Some(clean_markdown(&raw))
}

/// Normalizes converter output
///
/// - trailing whitespace is trimmed on every line
/// - runs of spaces collapse to one outside fenced code
/// - at most one blank line separates blocks
pub fn clean_markdown(markdown: &str) -> String {
    let mut out = String::with_capacity(markdown.len());
    let mut in_fence = false;
    let mut blank_run = 0;

    for line in markdown.lines() {
        let trimmed_end = line.trim_end();

        if trimmed_end.trim_start().starts_with("```") {
            in_fence = !in_fence;
        }

        if !in_fence && trimmed_end.trim().is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
            out.push('\n');
            continue;
        }
        blank_run = 0;

        if in_fence {
            out.push_str(trimmed_end);
        } else {
            out.push_str(&collapse_spaces(trimmed_end.trim_start()));
        }
        out.push('\n');
    }

    out.trim().to_string()
}

fn collapse_spaces(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut previous_space = false;
    for c in line.chars() {
        let is_space = c == ' ' || c == '\t' || c == '\u{a0}';
        if is_space {
            if !previous_space {
                out.push(' ');
            }
        } else {
            out.push(c);
        }
        previous_space = is_space;
    }
    out
}

/// Truncates to at most `max_chars` characters on a char boundary
pub fn truncate(markdown: &str, max_chars: usize) -> String {
    match markdown.char_indices().nth(max_chars) {
        Some((byte_index, _)) => markdown[..byte_index].trim_end().to_string(),
        None => markdown.to_string(),
    }
}
