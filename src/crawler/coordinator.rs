//! Pipeline coordinator - run orchestration for one seed site
//!
//! This module drives a complete run:
//! - Fetching the seed page under robustness control, stepping past
//!   redirect stubs and browser checks to an archive page when needed
//! - Fingerprinting the platform
//! - Discovering and ranking candidate links
//! - Processing links as bounded-concurrency tasks (fetch, extract,
//!   classify), with an optional rendering retry for script-driven pages
//! - Assembling the rank-ordered `SiteResult` and run statistics
//!
//! Only setup failures (invalid configuration, unparsable or unreachable
//! seed) are returned as errors. Every per-link failure is logged, counted,
//! and skipped.

use crate::classify::ContentClassifier;
use crate::config::{validate, Config};
use crate::crawler::render::{Renderer, WaitStrategy};
use crate::crawler::scheduler::ResultCollector;
use crate::crawler::{Fetcher, HttpFetcher};
use crate::discovery::{CandidateLink, DiscoveryEngine, LinkSource, SeedPage};
use crate::extraction::{
    detect_interstitial, ExtractionResult, ExtractionStrategySelector, Interstitial,
};
use crate::output::{ContentItem, RunStatistics, SiteResult};
use crate::platform::{Platform, PlatformDetector, PlatformFingerprint};
use crate::robustness::{HostRegistry, RobustnessManager};
use crate::state::LinkOutcome;
use crate::url::{is_same_site, normalize_url, resolve_link};
use crate::{LinkError, SiftError};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

/// Outcome of a completed run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub result: SiteResult,
    pub statistics: RunStatistics,
}

/// Main pipeline coordinator
///
/// A coordinator owns the host registry for the lifetime of its runs;
/// inject a fresh registry to isolate runs from each other.
pub struct Coordinator {
    config: Arc<Config>,
    robustness: Arc<RobustnessManager>,
    renderer: Option<Arc<dyn Renderer>>,
    detector: PlatformDetector,
    extractor: ExtractionStrategySelector,
    classifier: ContentClassifier,
}

/// Everything a link task needs, shared across tasks
struct LinkContext {
    robustness: Arc<RobustnessManager>,
    renderer: Option<Arc<dyn Renderer>>,
    extractor: ExtractionStrategySelector,
    classifier: ContentClassifier,
    fingerprint: PlatformFingerprint,
}

impl Coordinator {
    /// Creates a new coordinator
    ///
    /// # Arguments
    ///
    /// * `config` - The run configuration (validated here)
    /// * `fetcher` - The network fetch collaborator
    /// * `renderer` - Optional rendering collaborator for script-driven pages
    /// * `registry` - Host health registry for the run
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(SiftError::Config)` - The configuration is invalid
    pub fn new(
        config: Config,
        fetcher: Arc<dyn Fetcher>,
        renderer: Option<Arc<dyn Renderer>>,
        registry: Arc<HostRegistry>,
    ) -> Result<Self, SiftError> {
        validate(&config)?;

        if config.pipeline.render_js && renderer.is_none() {
            tracing::warn!(
                "JS rendering is enabled but no renderer is available; static results will stand"
            );
        }

        let robustness = Arc::new(RobustnessManager::new(&config, fetcher, registry));

        Ok(Self {
            detector: PlatformDetector::new(config.detection.platform_threshold),
            extractor: ExtractionStrategySelector::from_config(&config.pipeline),
            classifier: ContentClassifier::new(&config.detection),
            config: Arc::new(config),
            robustness,
            renderer,
        })
    }

    /// Runs the pipeline for one seed URL
    ///
    /// # Returns
    ///
    /// * `Ok(RunReport)` - The run completed, possibly with zero items
    /// * `Err(SiftError)` - The seed URL is invalid or unreachable
    pub async fn run(&self, seed: &str) -> Result<RunReport, SiftError> {
        let start_time = Instant::now();
        let seed_url = normalize_url(seed)?;
        let site = seed_url.to_string();
        let mut statistics = RunStatistics::new();

        tracing::info!("Starting run for {}", seed_url);

        let mut markup = match self.robustness.fetch(&seed_url).await {
            Ok(response) => response.body,
            Err(e @ LinkError::Permanent { .. }) => {
                tracing::warn!("Seed page refused: {}; returning an empty result", e);
                statistics.candidates = 1;
                statistics.record(LinkOutcome::from(&e));
                return Ok(self.finish(SiteResult::empty(site), statistics, start_time));
            }
            Err(e) => {
                return Err(SiftError::SeedUnreachable {
                    url: site,
                    reason: e.to_string(),
                });
            }
        };

        let mut fingerprint = self.detector.detect(&markup, &seed_url);
        let mut page_url = seed_url.clone();
        if let Some(found) = detect_interstitial(&markup) {
            tracing::warn!("Seed page {} is a {}; trying alternatives", seed_url, found.kind);
            match self.seed_alternative(&seed_url, &found, &fingerprint).await {
                Some((url, alternative)) => {
                    fingerprint = self.detector.detect(&alternative, &url);
                    page_url = url;
                    markup = alternative;
                }
                None => tracing::warn!("No usable alternative to {}", seed_url),
            }
        }

        tracing::info!(
            "Detected platform {} ({:.2} confidence, signals: {:?})",
            fingerprint.platform,
            fingerprint.confidence,
            fingerprint.signals
        );
        statistics.platform = Some(fingerprint.clone());

        let seed_page = SeedPage {
            url: page_url,
            markup,
        };
        let discovery =
            DiscoveryEngine::new(Arc::clone(&self.robustness), self.config.pipeline.max_sitemaps);
        let links: Vec<CandidateLink> = discovery
            .discover(
                &seed_page,
                &fingerprint,
                self.config.pipeline.max_additional_pages,
            )
            .await
            .collect();
        statistics.candidates = links.len();

        let context = Arc::new(LinkContext {
            robustness: Arc::clone(&self.robustness),
            renderer: self.renderer.clone(),
            extractor: self.extractor.clone(),
            classifier: self.classifier.clone(),
            fingerprint,
        });

        let items = self
            .process_links(links, seed_page.markup, context, &mut statistics)
            .await;

        self.log_open_circuits(&mut statistics);
        let result = SiteResult { site, items };
        Ok(self.finish(result, statistics, start_time))
    }

    /// Processes candidates in rank order with bounded concurrency
    ///
    /// New tasks stop starting once `max_articles` items are collected;
    /// tasks already in flight run to completion.
    async fn process_links(
        &self,
        links: Vec<CandidateLink>,
        seed_markup: String,
        context: Arc<LinkContext>,
        statistics: &mut RunStatistics,
    ) -> Vec<ContentItem> {
        let total = links.len();
        let semaphore = Arc::new(Semaphore::new(self.config.pipeline.concurrency));
        let collector = Arc::new(Mutex::new(ResultCollector::new(
            self.config.pipeline.max_articles,
        )));
        let mut tasks = JoinSet::new();
        let mut seed_markup = Some(seed_markup);
        let mut started = 0;

        for (rank, link) in links.into_iter().enumerate() {
            let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
                break;
            };
            if collector.lock().is_full() {
                tracing::debug!("Article limit reached; not starting {}", link.url);
                break;
            }

            let prefetched = if link.source == LinkSource::Seed {
                seed_markup.take()
            } else {
                None
            };
            let context = Arc::clone(&context);
            let collector = Arc::clone(&collector);
            started += 1;

            tasks.spawn(async move {
                let outcome = context.process(&link, prefetched).await;
                {
                    let mut collector = collector.lock();
                    match outcome {
                        Ok(item) => {
                            tracing::info!("Collected [{}] {}", item.content_type, link.url);
                            collector.collect(rank, item);
                        }
                        Err(e) => {
                            tracing::info!("Skipping {}: {}", link.url, e);
                            collector.skip(rank, LinkOutcome::from(&e));
                        }
                    }
                }
                drop(permit);
            });
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                tracing::error!("Link task failed: {}", e);
            }
        }

        for _ in started..total {
            statistics.record(LinkOutcome::NotStarted);
        }

        let collector = match Arc::try_unwrap(collector) {
            Ok(collector) => collector.into_inner(),
            Err(shared) => {
                let mut guard = shared.lock();
                std::mem::replace(&mut *guard, ResultCollector::new(0))
            }
        };
        for outcome in collector.outcomes() {
            statistics.record(outcome);
        }
        collector.into_items()
    }

    /// First same-site stand-in for an interstitial seed that fetches cleanly
    ///
    /// Tries the refresh target, then the platform's archive pages, then the
    /// generic ones.
    async fn seed_alternative(
        &self,
        seed_url: &Url,
        found: &Interstitial,
        fingerprint: &PlatformFingerprint,
    ) -> Option<(Url, String)> {
        for url in alternative_urls(seed_url, found, fingerprint) {
            match self.robustness.fetch(&url).await {
                Ok(response) => match detect_interstitial(&response.body) {
                    None => {
                        tracing::info!("Using {} in place of the seed page", url);
                        return Some((url, response.body));
                    }
                    Some(again) => tracing::debug!("{} is also a {}", url, again.kind),
                },
                Err(e) => tracing::debug!("Alternative {} failed: {}", url, e),
            }
        }
        None
    }

    fn log_open_circuits(&self, statistics: &mut RunStatistics) {
        statistics.open_circuits = self.robustness.registry().open_hosts();
    }

    fn finish(
        &self,
        result: SiteResult,
        mut statistics: RunStatistics,
        start_time: Instant,
    ) -> RunReport {
        statistics.elapsed = start_time.elapsed();
        statistics.log();
        RunReport { result, statistics }
    }
}

impl LinkContext {
    /// Fetches, extracts, and classifies one candidate link
    async fn process(
        &self,
        link: &CandidateLink,
        prefetched: Option<String>,
    ) -> Result<ContentItem, LinkError> {
        let mut markup = match prefetched {
            Some(markup) => markup,
            None => self.robustness.fetch(&link.url).await?.body,
        };

        let mut rendered = false;
        if let Some(found) = detect_interstitial(&markup) {
            tracing::debug!("{}: static markup is a {}; rendering", link.url, found.kind);
            markup = self
                .render_markup(&link.url)
                .await
                .filter(|page| detect_interstitial(page).is_none())
                .ok_or_else(|| LinkError::Interstitial {
                    url: link.url.to_string(),
                    kind: found.kind,
                })?;
            rendered = true;
        }

        let mut result = self.extractor.extract(&markup, &link.url, &self.fingerprint);
        if !result.is_usable() && !rendered {
            if let Some(page) = self.render(&link.url).await {
                result = page;
            }
        }

        if !result.is_usable() {
            return Err(LinkError::Extraction {
                url: link.url.to_string(),
            });
        }

        let classification = self.classifier.classify(&result, &link.url);
        tracing::debug!(
            "{}: {} via {} ({:.2} confidence)",
            link.url,
            classification.content_type,
            result.method,
            classification.confidence
        );

        Ok(ContentItem {
            title: result
                .title
                .unwrap_or_else(|| fallback_title(&link.url)),
            content: result.content_markdown,
            content_type: classification.content_type,
            source_url: link.url.to_string(),
        })
    }

    /// Re-renders a page in the browser and extracts again
    ///
    /// Rendering goes through the same circuit and pacing gate as fetches.
    /// Returns None unless rendering is available and produced usable
    /// content.
    async fn render(&self, url: &Url) -> Option<ExtractionResult> {
        tracing::debug!("{}: static markup unusable; rendering", url);
        let markup = self.render_markup(url).await?;
        let result = self.extractor.extract(&markup, url, &self.fingerprint);
        result.is_usable().then_some(result)
    }

    async fn render_markup(&self, url: &Url) -> Option<String> {
        let renderer = self.renderer.as_ref()?;
        match self
            .robustness
            .render(renderer.as_ref(), url, &WaitStrategy::Load)
            .await
        {
            Ok(markup) => Some(markup),
            Err(e) => {
                tracing::debug!("{}: rendering failed: {}", url, e);
                None
            }
        }
    }
}

/// Candidate stand-ins for an interstitial seed, in trial order
fn alternative_urls(
    seed_url: &Url,
    found: &Interstitial,
    fingerprint: &PlatformFingerprint,
) -> Vec<Url> {
    let target = found
        .target
        .as_deref()
        .and_then(|href| resolve_link(href, seed_url))
        .filter(|url| is_same_site(url, seed_url));
    let archives = fingerprint
        .profile()
        .archive_paths
        .iter()
        .chain(Platform::Generic.profile().archive_paths)
        .filter_map(|path| resolve_link(path, seed_url));

    let mut seen = HashSet::from([seed_url.clone()]);
    target
        .into_iter()
        .chain(archives)
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

/// Title derived from the last path segment when a page has none
fn fallback_title(url: &Url) -> String {
    url.path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(|slug| slug.replace(['-', '_'], " "))
        .filter(|title| !title.trim().is_empty())
        .unwrap_or_else(|| url.to_string())
}

/// Runs the pipeline with the default network collaborators
///
/// This is the main entry point for a run. It will:
/// 1. Validate the configuration
/// 2. Build the HTTP fetcher (and the headless renderer when the `browser`
///    feature is compiled in and JS rendering is enabled)
/// 3. Fetch the seed, fingerprint, discover, and process candidates
/// 4. Return the rank-ordered result with run statistics
///
/// # Arguments
///
/// * `config` - The run configuration
/// * `seed` - The seed URL
///
/// # Example
///
/// ```no_run
/// use sumi_sift::config::Config;
/// use sumi_sift::crawler::run_pipeline;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let report = run_pipeline(Config::default(), "https://example.com/").await?;
/// println!("{} item(s)", report.result.items.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_pipeline(config: Config, seed: &str) -> Result<RunReport, SiftError> {
    let fetcher = Arc::new(HttpFetcher::new(&config.network)?);
    let registry = Arc::new(HostRegistry::new(config.circuit_breaker.clone()));
    let renderer = default_renderer(&config);

    let coordinator = Coordinator::new(config, fetcher, renderer, registry)?;
    coordinator.run(seed).await
}

#[cfg(feature = "browser")]
fn default_renderer(config: &Config) -> Option<Arc<dyn Renderer>> {
    if config.pipeline.render_js {
        Some(Arc::new(crate::crawler::render::ChromiumRenderer::new()))
    } else {
        None
    }
}

#[cfg(not(feature = "browser"))]
fn default_renderer(_config: &Config) -> Option<Arc<dyn Renderer>> {
    None
}
