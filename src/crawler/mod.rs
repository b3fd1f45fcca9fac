//! Crawler module for page fetching and run coordination
//!
//! This module contains the pipeline plumbing, including:
//! - The network fetch collaborator and its reqwest implementation
//! - Browser-like request headers and user agent rotation
//! - HTML parsing and link extraction
//! - The optional rendering collaborator for script-driven pages
//! - Rank-ordered result collection
//! - Overall run coordination

mod coordinator;
mod fetcher;
mod headers;
mod parser;
mod render;
mod scheduler;

pub use coordinator::{run_pipeline, Coordinator, RunReport};
pub use fetcher::{build_http_client, FetchError, FetchResponse, Fetcher, HttpFetcher};
pub use headers::{HeaderProfile, RequestHeaders};
pub use parser::{parse_html, ParsedPage};
#[cfg(feature = "browser")]
pub use render::ChromiumRenderer;
pub use render::{RenderError, Renderer, WaitStrategy};
pub use scheduler::ResultCollector;
