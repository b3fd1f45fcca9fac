//! Sumi-Sift: a platform-aware content harvester
//!
//! This crate discovers, extracts, and classifies articles and documentation
//! pages from arbitrary websites, producing a uniform `{site, items}` record
//! without any site-specific configuration. It fingerprints the publishing
//! platform, enumerates candidate links from sitemaps, feeds, and in-page
//! links, and governs every network call with rate limiting, retry with
//! backoff, and a per-host circuit breaker.

pub mod classify;
pub mod config;
pub mod crawler;
pub mod discovery;
pub mod extraction;
pub mod output;
pub mod platform;
pub mod robustness;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Sumi-Sift operations
///
/// Only setup failures reach the caller as errors. Per-link failures are
/// recorded as [`LinkError`] and reduce the item count instead.
#[derive(Debug, Error)]
pub enum SiftError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Seed URL {url} is unreachable: {reason}")]
    SeedUnreachable { url: String, reason: String },

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SiftError {
    /// Returns true for failures that prevent a run from starting at all
    pub fn is_setup_failure(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::SeedUnreachable { .. } | Self::Url(_)
        )
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,

    #[error("Malformed URL: {0}")]
    Malformed(String),
}

/// Per-link failures
///
/// These never abort a run; the orchestrator logs them and skips the link.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    /// Timeout, 5xx, or connection reset that survived the retry budget
    #[error("Transient failure for {url} after {attempts} attempt(s): {reason}")]
    Transient {
        url: String,
        attempts: u32,
        reason: String,
    },

    /// 403, 404, or a malformed response; never retried
    #[error("Permanent failure for {url}: {reason}")]
    Permanent {
        url: String,
        status: Option<u16>,
        reason: String,
    },

    /// The host's circuit is open; no network I/O was attempted
    #[error("Circuit open for host {host}")]
    CircuitOpen { host: String },

    /// Every extraction method fell below the quality threshold
    #[error("No usable content extracted from {url}")]
    Extraction { url: String },

    /// A redirect stub, browser check, or terms wall stood in front of the
    /// content, and rendering did not get past it
    #[error("{url} is a {kind}")]
    Interstitial {
        url: String,
        kind: extraction::InterstitialKind,
    },
}

/// Result type alias for Sumi-Sift operations
pub type Result<T> = std::result::Result<T, SiftError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use classify::{ContentClassifier, ContentType};
pub use config::Config;
pub use crawler::{run_pipeline, Coordinator, RunReport};
pub use output::{ContentItem, SiteResult};
pub use platform::{Platform, PlatformDetector, PlatformFingerprint};
pub use state::{CircuitState, HostHealth, LinkOutcome};
pub use crate::url::normalize_url;
