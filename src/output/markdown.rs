//! Human-readable renderings of a site result
//!
//! This module formats a [`SiteResult`] as a markdown report or as plain
//! text for the terminal.

use crate::output::types::SiteResult;

/// Formats a site result as markdown
///
/// # Arguments
///
/// * `result` - The site result
///
/// # Returns
///
/// A markdown document with one section per item
pub fn format_markdown(result: &SiteResult) -> String {
    let mut md = String::new();

    md.push_str(&format!("# Content from {}\n\n", result.site));
    md.push_str(&format!("- **Items**: {}\n\n", result.items.len()));

    if result.items.is_empty() {
        md.push_str("_No content was collected._\n");
        return md;
    }

    for item in &result.items {
        md.push_str("---\n\n");
        md.push_str(&format!("## {}\n\n", item.title));
        md.push_str(&format!("- **Type**: {}\n", item.content_type));
        md.push_str(&format!("- **Source**: <{}>\n\n", item.source_url));
        md.push_str(item.content.trim());
        md.push_str("\n\n");
    }

    md
}

/// Formats a site result as plain text
pub fn format_text(result: &SiteResult) -> String {
    let mut out = String::new();

    out.push_str(&format!("Site: {}\n", result.site));
    out.push_str(&format!("Items: {}\n", result.items.len()));

    for (index, item) in result.items.iter().enumerate() {
        out.push('\n');
        out.push_str(&format!("[{}] {}\n", index + 1, item.title));
        out.push_str(&format!("    type:   {}\n", item.content_type));
        out.push_str(&format!("    source: {}\n", item.source_url));
        out.push_str(&format!("    words:  {}\n", item.content.split_whitespace().count()));
    }

    out
}
