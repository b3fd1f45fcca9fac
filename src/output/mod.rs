//! Output module for rendering and persisting site results
//!
//! This module handles:
//! - The `SiteResult` / `ContentItem` output contract
//! - Rendering results as JSON, markdown, or plain text
//! - Writing the timestamped JSON document
//! - Run statistics

mod json;
mod markdown;
pub mod stats;
mod types;

pub use json::{default_output_filename, to_json_string, write_json};
pub use markdown::{format_markdown, format_text};
pub use stats::{format_statistics, RunStatistics};
pub use types::{ContentItem, OutputError, OutputFormat, OutputResult, SiteResult};

/// Renders a site result in the requested format
pub fn render(result: &SiteResult, format: OutputFormat) -> OutputResult<String> {
    match format {
        OutputFormat::Json => to_json_string(result),
        OutputFormat::Markdown => Ok(format_markdown(result)),
        OutputFormat::Text => Ok(format_text(result)),
    }
}
