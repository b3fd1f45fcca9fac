//! Browser-like request headers
//!
//! Requests carry the header set a desktop browser sends on a top-level
//! navigation. The user agent rotates through a pool every few requests
//! unless a custom agent is configured, and the previously requested URL is
//! sent as the referer.

use crate::config::NetworkConfig;
use parking_lot::Mutex;
use rand::seq::SliceRandom;

/// Realistic desktop user agents
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14.4; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36 Edg/124.0.0.0",
];

/// Static part of the browser header set
const BASE_HEADERS: &[(&str, &str)] = &[
    (
        "Accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
    ),
    ("Accept-Language", "en-US,en;q=0.5"),
    ("DNT", "1"),
    ("Upgrade-Insecure-Requests", "1"),
    ("Sec-Fetch-Dest", "document"),
    ("Sec-Fetch-Mode", "navigate"),
    ("Sec-Fetch-Site", "none"),
    ("Cache-Control", "max-age=0"),
];

/// Ordered header name/value pairs for one request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestHeaders {
    pairs: Vec<(String, String)>,
}

impl RequestHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a header
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((name.into(), value.into()));
    }

    /// Looks up a header value by case-insensitive name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.get("User-Agent")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

#[derive(Debug)]
struct Rotation {
    requests: u64,
    agent: String,
    last_url: Option<String>,
}

/// Produces the header set for each outgoing request
#[derive(Debug)]
pub struct HeaderProfile {
    custom_agent: Option<String>,
    rotate_every: u64,
    rotation: Mutex<Rotation>,
}

impl HeaderProfile {
    /// Creates a profile from the network configuration
    pub fn new(config: &NetworkConfig) -> Self {
        let agent = config
            .user_agent
            .clone()
            .unwrap_or_else(|| random_agent().to_string());

        Self {
            custom_agent: config.user_agent.clone(),
            rotate_every: u64::from(config.rotate_every.max(1)),
            rotation: Mutex::new(Rotation {
                requests: 0,
                agent,
                last_url: None,
            }),
        }
    }

    /// Builds the headers for a request to `url`
    ///
    /// Rotates the agent every `rotate_every` requests and records `url` as
    /// the referer for the next request.
    pub fn next_headers(&self, url: &str) -> RequestHeaders {
        let mut rotation = self.rotation.lock();

        if self.custom_agent.is_none()
            && rotation.requests > 0
            && rotation.requests % self.rotate_every == 0
        {
            rotation.agent = random_agent().to_string();
        }
        rotation.requests += 1;

        let mut headers = RequestHeaders::new();
        headers.insert("User-Agent", rotation.agent.clone());
        for (name, value) in BASE_HEADERS {
            headers.insert(*name, *value);
        }
        if let Some(referer) = rotation.last_url.replace(url.to_string()) {
            headers.insert("Referer", referer);
        }

        headers
    }

    /// Number of header sets handed out so far
    pub fn requests_made(&self) -> u64 {
        self.rotation.lock().requests
    }
}

fn random_agent() -> &'static str {
    USER_AGENTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(USER_AGENTS[0])
}
