//! Candidate links and their ranking

use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use url::Url;

/// Where a candidate link was found, highest priority first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkSource {
    Seed,
    Sitemap,
    Feed,
    Archive,
    Crawl,
}

impl LinkSource {
    /// Priority weight of the source, in (0, 1]
    pub fn weight(self) -> f64 {
        match self {
            Self::Seed => 1.0,
            Self::Sitemap => 0.8,
            Self::Feed => 0.6,
            Self::Archive => 0.4,
            Self::Crawl => 0.2,
        }
    }
}

impl fmt::Display for LinkSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Seed => "seed",
            Self::Sitemap => "sitemap",
            Self::Feed => "feed",
            Self::Archive => "archive",
            Self::Crawl => "crawl",
        };
        write!(f, "{}", name)
    }
}

/// A discovered URL considered for extraction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateLink {
    /// Normalized absolute URL; the dedup key
    pub url: Url,
    pub source: LinkSource,
    pub priority_score: f64,
    /// Order of discovery across all sources
    pub discovered_at: usize,
}

/// Deduplicating accumulator of candidate links
#[derive(Debug, Default)]
pub struct CandidateSet {
    links: Vec<CandidateLink>,
    seen: HashSet<String>,
}

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a link unless its normalized URL was already seen
    ///
    /// Returns true if the link was new.
    pub fn insert(&mut self, url: Url, source: LinkSource) -> bool {
        if !self.seen.insert(url.as_str().to_string()) {
            return false;
        }
        let discovered_at = self.links.len();
        self.links.push(CandidateLink {
            url,
            source,
            priority_score: source.weight(),
            discovered_at,
        });
        true
    }

    pub(crate) fn len(&self) -> usize {
        self.links.len()
    }

    /// Number of links gathered from a given source
    pub fn count_from(&self, source: LinkSource) -> usize {
        self.links.iter().filter(|l| l.source == source).count()
    }

    /// Ranks by source priority then discovery order, and keeps the top `limit`
    pub fn into_ranked(mut self, limit: usize) -> CandidateLinks {
        self.links
            .sort_by(|a, b| a.source.cmp(&b.source).then(a.discovered_at.cmp(&b.discovered_at)));
        self.links.truncate(limit);
        CandidateLinks {
            inner: self.links.into_iter(),
        }
    }
}

/// Finite, ranked, non-restartable sequence of candidate links
#[derive(Debug)]
pub struct CandidateLinks {
    inner: std::vec::IntoIter<CandidateLink>,
}

impl Iterator for CandidateLinks {
    type Item = CandidateLink;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for CandidateLinks {}
