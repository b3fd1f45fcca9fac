//! HTTP fetcher implementation
//!
//! This module defines the network collaborator the pipeline talks through:
//! - The `Fetcher` trait: one attempt, no retries, no status interpretation
//! - `HttpFetcher`: the reqwest-backed implementation
//! - Transport error classification (timeout, connect, reset, malformed)
//!
//! Retry, pacing, and circuit breaking live in [`crate::robustness`]; a
//! fetcher only reports what happened on a single attempt.

use crate::config::NetworkConfig;
use crate::crawler::headers::RequestHeaders;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Maximum redirect hops followed per request
const MAX_REDIRECTS: usize = 10;

/// Response of a single fetch attempt
///
/// Any HTTP status is a successful exchange at this level; the robustness
/// layer decides whether the status is usable, transient, or permanent.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// HTTP status code
    pub status: u16,

    /// Final URL after redirects
    pub final_url: String,

    /// Response body
    pub body: String,
}

impl FetchResponse {
    /// Returns true for 2xx statuses
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport-level failure of a single fetch attempt
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Request timed out")]
    Timeout,

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Connection reset: {0}")]
    Reset(String),

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Request failed: {0}")]
    Other(String),
}

impl FetchError {
    /// Returns true if retrying the same request may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout | Self::Connect(_) | Self::Reset(_))
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::Connect(e.to_string())
        } else if e.is_decode() {
            Self::Malformed(e.to_string())
        } else if e.is_request() || e.is_body() {
            Self::Reset(e.to_string())
        } else {
            Self::Other(e.to_string())
        }
    }
}

/// Network fetch collaborator
///
/// Implementations perform exactly one attempt per call.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches `url` with the given headers and per-attempt timeout
    async fn fetch(
        &self,
        url: &Url,
        headers: &RequestHeaders,
        timeout: Duration,
    ) -> Result<FetchResponse, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// The user agent is not fixed on the client; every request carries the
/// header set produced by [`crate::crawler::HeaderProfile`].
///
/// # Arguments
///
/// * `config` - The network configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use sumi_sift::config::NetworkConfig;
/// use sumi_sift::crawler::build_http_client;
///
/// let client = build_http_client(&NetworkConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &NetworkConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(config.timeout())
        .connect_timeout(config.timeout().min(Duration::from_secs(10)))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetcher backed by a shared reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher with a client built from the network configuration
    pub fn new(config: &NetworkConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }

    /// Wraps an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(
        &self,
        url: &Url,
        headers: &RequestHeaders,
        timeout: Duration,
    ) -> Result<FetchResponse, FetchError> {
        let mut request = self.client.get(url.as_str()).timeout(timeout);
        for (name, value) in headers.iter() {
            request = request.header(name, value);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let final_url = response.url().to_string();

        tracing::trace!("GET {} -> {} ({})", url, status, final_url);

        let body = response.text().await?;

        Ok(FetchResponse {
            status,
            final_url,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&NetworkConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_transient_classification() {
        assert!(FetchError::Timeout.is_transient());
        assert!(FetchError::Connect("refused".to_string()).is_transient());
        assert!(FetchError::Reset("reset by peer".to_string()).is_transient());
        assert!(!FetchError::Malformed("bad gzip".to_string()).is_transient());
        assert!(!FetchError::Other("builder".to_string()).is_transient());
    }

    #[test]
    fn test_response_success_range() {
        let mut response = FetchResponse {
            status: 200,
            final_url: "https://example.com/".to_string(),
            body: String::new(),
        };
        assert!(response.is_success());

        response.status = 204;
        assert!(response.is_success());

        response.status = 301;
        assert!(!response.is_success());

        response.status = 503;
        assert!(!response.is_success());
    }
}
