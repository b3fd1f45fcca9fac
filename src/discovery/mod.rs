//! Link discovery
//!
//! Enumerates candidate content URLs for a site, in source priority order:
//! 1. The seed page itself (always present)
//! 2. Sitemaps (robots.txt directives, well-known paths, platform extras)
//! 3. Syndication feeds (advertised in the seed page, then platform paths)
//! 4. Platform archive or listing pages
//! 5. In-page links of the seed page
//!
//! Sources are merged and deduplicated by normalized URL. Gathering stops as
//! soon as `max_additional_pages` links beyond the seed are collected, so a
//! site with a rich sitemap never has its feeds or archive fetched. Network
//! failures inside a source only empty that source.

mod candidate;
mod feed;
mod filter;
mod sitemap;

pub use candidate::{CandidateLink, CandidateLinks, CandidateSet, LinkSource};
pub use feed::{advertised_feeds, parse_feed};
pub use filter::{is_taxonomy_sitemap, looks_like_content};
pub use sitemap::{parse_sitemap, robots_sitemaps, SitemapDocument, WELL_KNOWN_SITEMAPS};

use crate::crawler::parse_html;
use crate::platform::{PlatformFingerprint, PlatformProfile};
use crate::robustness::RobustnessManager;
use crate::url::{is_same_site, normalize_parsed, resolve_link};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use thiserror::Error;
use url::Url;

/// Failures parsing a structured discovery source
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiscoveryError {
    #[error("Malformed XML: {0}")]
    Xml(String),

    #[error("Document root <{0}> is not a sitemap")]
    NotASitemap(String),

    #[error("Document is not an RSS or Atom feed")]
    NotAFeed,
}

/// The fetched seed page
#[derive(Debug, Clone)]
pub struct SeedPage {
    /// Normalized seed URL
    pub url: Url,
    pub markup: String,
}

/// Discovers and ranks candidate links for one site
pub struct DiscoveryEngine {
    robustness: Arc<RobustnessManager>,
    max_sitemaps: usize,
}

/// Running state of one discovery pass
struct Gather<'a> {
    seed: &'a Url,
    limit: usize,
    set: CandidateSet,
}

impl Gather<'_> {
    fn is_full(&self) -> bool {
        self.set.len() >= self.limit
    }

    /// Offers a raw link; returns true if it was accepted
    fn offer(&mut self, raw: &str, base: &Url, source: LinkSource) -> bool {
        if self.is_full() {
            return false;
        }
        match resolve_link(raw, base) {
            Some(url) => self.offer_url(url, source),
            None => false,
        }
    }

    fn offer_url(&mut self, url: Url, source: LinkSource) -> bool {
        if self.is_full() || !is_same_site(&url, self.seed) || !looks_like_content(&url) {
            return false;
        }
        self.set.insert(url, source)
    }
}

impl DiscoveryEngine {
    /// Creates an engine that fetches through `robustness`
    ///
    /// # Arguments
    ///
    /// * `robustness` - Governs every discovery request
    /// * `max_sitemaps` - Upper bound on sitemap documents fetched per run
    pub fn new(robustness: Arc<RobustnessManager>, max_sitemaps: usize) -> Self {
        Self {
            robustness,
            max_sitemaps,
        }
    }

    /// Discovers candidate links for the site of `seed`
    ///
    /// # Returns
    ///
    /// A ranked sequence starting with the seed, of length at most
    /// `max_additional_pages + 1`. With `max_additional_pages == 0` the
    /// sequence is exactly the seed and no request is made.
    pub async fn discover(
        &self,
        seed: &SeedPage,
        fingerprint: &PlatformFingerprint,
        max_additional_pages: usize,
    ) -> CandidateLinks {
        let mut gather = Gather {
            seed: &seed.url,
            limit: max_additional_pages.saturating_add(1),
            set: CandidateSet::new(),
        };
        gather.set.insert(seed.url.clone(), LinkSource::Seed);

        if max_additional_pages == 0 {
            return gather.set.into_ranked(1);
        }

        let profile = fingerprint.profile();

        self.gather_sitemaps(&mut gather, profile).await;
        if !gather.is_full() {
            self.gather_feeds(&mut gather, seed, profile).await;
        }
        if !gather.is_full() {
            self.gather_archives(&mut gather, profile).await;
        }
        if !gather.is_full() {
            let parsed = parse_html(&seed.markup, &seed.url);
            for link in parsed.links {
                gather.offer_url(link, LinkSource::Crawl);
            }
        }

        tracing::info!(
            "Discovered {} candidate(s): {} sitemap, {} feed, {} archive, {} crawl",
            gather.set.len(),
            gather.set.count_from(LinkSource::Sitemap),
            gather.set.count_from(LinkSource::Feed),
            gather.set.count_from(LinkSource::Archive),
            gather.set.count_from(LinkSource::Crawl),
        );

        let limit = gather.limit;
        gather.set.into_ranked(limit)
    }

    /// Fetches a URL and returns its body, or None on any failure
    async fn fetch_body(&self, url: &Url, what: &str) -> Option<String> {
        match self.robustness.fetch(url).await {
            Ok(response) => Some(response.body),
            Err(e) => {
                tracing::debug!("No {} at {}: {}", what, url, e);
                None
            }
        }
    }

    async fn gather_sitemaps(&self, gather: &mut Gather<'_>, profile: &PlatformProfile) {
        let mut queue: VecDeque<Url> = VecDeque::new();
        let mut queued: HashSet<String> = HashSet::new();
        let mut enqueue = |queue: &mut VecDeque<Url>, url: Url| {
            if queued.insert(url.as_str().to_string()) {
                queue.push_back(url);
            }
        };

        if let Ok(robots_url) = gather.seed.join("/robots.txt") {
            if let Some(body) = self.fetch_body(&robots_url, "robots.txt").await {
                for loc in robots_sitemaps(&body) {
                    if let Ok(url) = Url::parse(&loc) {
                        enqueue(&mut queue, url);
                    }
                }
            }
        }
        for path in WELL_KNOWN_SITEMAPS.iter().chain(profile.sitemap_paths) {
            if let Ok(url) = gather.seed.join(path) {
                enqueue(&mut queue, url);
            }
        }

        let mut fetched = 0;
        while let Some(sitemap_url) = queue.pop_front() {
            if gather.is_full() || fetched >= self.max_sitemaps {
                break;
            }
            fetched += 1;

            let Some(body) = self.fetch_body(&sitemap_url, "sitemap").await else {
                continue;
            };

            match parse_sitemap(&body) {
                Ok(SitemapDocument::Index(children)) => {
                    tracing::debug!("Sitemap index {} lists {} sitemap(s)", sitemap_url, children.len());
                    for child in children {
                        match Url::parse(&child) {
                            Ok(url) if !is_taxonomy_sitemap(&url) => enqueue(&mut queue, url),
                            _ => {}
                        }
                    }
                }
                Ok(SitemapDocument::UrlSet(locs)) => {
                    let accepted = locs
                        .iter()
                        .filter(|loc| gather.offer(loc, &sitemap_url, LinkSource::Sitemap))
                        .count();
                    tracing::debug!(
                        "Sitemap {} yielded {} of {} location(s)",
                        sitemap_url,
                        accepted,
                        locs.len()
                    );
                }
                Err(e) => tracing::debug!("Ignoring sitemap {}: {}", sitemap_url, e),
            }
        }
    }

    async fn gather_feeds(&self, gather: &mut Gather<'_>, seed: &SeedPage, profile: &PlatformProfile) {
        let mut feeds = advertised_feeds(&seed.markup, &seed.url);
        for path in profile.feed_paths {
            if let Ok(url) = seed.url.join(path) {
                feeds.push(url);
            }
        }

        let mut tried = HashSet::new();
        for feed_url in feeds {
            if gather.is_full() {
                break;
            }
            let Ok(feed_url) = normalize_parsed(feed_url) else {
                continue;
            };
            if !tried.insert(feed_url.as_str().to_string()) {
                continue;
            }

            let Some(body) = self.fetch_body(&feed_url, "feed").await else {
                continue;
            };
            match parse_feed(&body) {
                Ok(links) => {
                    let accepted = links
                        .iter()
                        .filter(|link| gather.offer(link, &feed_url, LinkSource::Feed))
                        .count();
                    tracing::debug!("Feed {} yielded {} link(s)", feed_url, accepted);
                }
                Err(e) => tracing::debug!("Ignoring feed {}: {}", feed_url, e),
            }
        }
    }

    async fn gather_archives(&self, gather: &mut Gather<'_>, profile: &PlatformProfile) {
        for path in profile.archive_paths {
            if gather.is_full() {
                break;
            }
            let Some(archive_url) = gather.seed.join(path).ok().and_then(|u| normalize_parsed(u).ok())
            else {
                continue;
            };
            if archive_url == *gather.seed {
                continue;
            }

            let Some(body) = self.fetch_body(&archive_url, "archive").await else {
                continue;
            };
            let parsed = parse_html(&body, &archive_url);
            let accepted = parsed
                .links
                .into_iter()
                .filter(|link| *link != archive_url)
                .filter(|link| gather.offer_url(link.clone(), LinkSource::Archive))
                .count();
            tracing::debug!("Archive {} yielded {} link(s)", archive_url, accepted);
        }
    }
}
