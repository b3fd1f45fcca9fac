//! Content extraction with a fallback chain
//!
//! Methods are tried in order until one produces markdown that passes the
//! quality check:
//! 1. `readability` - paragraph-scoring heuristic
//! 2. `platform-selectors` - the detected platform's content selectors
//! 3. `body-text` - the whole body minus noise
//!
//! If none passes, a `fallback-minimal` result carries the plain page text
//! and is flagged low-confidence so the pipeline drops it.

mod cleanup;
mod interstitial;
mod markdown;
mod readability;

pub use cleanup::{clean_html, clean_text, noise_nodes};
pub use interstitial::{detect_interstitial, Interstitial, InterstitialKind};
pub use markdown::{clean_markdown, to_markdown, truncate};

use crate::config::PipelineConfig;
use crate::platform::{PlatformFingerprint, PlatformProfile};
use ego_tree::NodeId;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use url::Url;

/// Minimum words in a paragraph-like block
const PARAGRAPH_MIN_WORDS: usize = 8;

/// Minimum characters in a paragraph-like block
const PARAGRAPH_MIN_CHARS: usize = 40;

/// One step of the extraction chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractionMethod {
    Readability,
    PlatformSelectors,
    BodyText,
    FallbackMinimal,
}

impl ExtractionMethod {
    /// Methods that can produce an accepted result, in order
    pub const CHAIN: [ExtractionMethod; 3] = [
        ExtractionMethod::Readability,
        ExtractionMethod::PlatformSelectors,
        ExtractionMethod::BodyText,
    ];
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Readability => "readability",
            Self::PlatformSelectors => "platform-selectors",
            Self::BodyText => "body-text",
            Self::FallbackMinimal => "fallback-minimal",
        };
        write!(f, "{}", name)
    }
}

/// Outcome of extracting one page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionResult {
    pub url: String,
    pub title: Option<String>,
    pub content_markdown: String,
    /// Characters of markdown before truncation
    pub raw_length: usize,
    pub method: ExtractionMethod,
    /// Set on fallback-minimal results; such results are never emitted
    pub low_confidence: bool,
}

impl ExtractionResult {
    /// True if the result may become a content item
    pub fn is_usable(&self) -> bool {
        !self.low_confidence && !self.content_markdown.trim().is_empty()
    }
}

/// Chooses and runs extraction methods for a page
#[derive(Debug, Clone)]
pub struct ExtractionStrategySelector {
    min_content_length: usize,
    max_content_length: usize,
}

impl ExtractionStrategySelector {
    pub fn new(min_content_length: usize, max_content_length: usize) -> Self {
        Self {
            min_content_length,
            max_content_length: max_content_length.max(1),
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.min_content_length, config.max_content_length)
    }

    /// Extracts the main content of a page
    ///
    /// # Arguments
    ///
    /// * `markup` - Raw page HTML (may be malformed)
    /// * `url` - The page URL
    /// * `fingerprint` - Fingerprint of the site, selecting platform selectors
    ///
    /// # Returns
    ///
    /// The first result that passes the quality check, or a low-confidence
    /// `FallbackMinimal` result. Never fails.
    pub fn extract(
        &self,
        markup: &str,
        url: &Url,
        fingerprint: &PlatformFingerprint,
    ) -> ExtractionResult {
        let document = Html::parse_document(markup);
        let noise = noise_nodes(&document);
        let profile = fingerprint.profile();
        let title = select_title(&document, profile);

        for method in ExtractionMethod::CHAIN {
            let block = match method {
                ExtractionMethod::Readability => readability::best_container(&document, &noise),
                ExtractionMethod::PlatformSelectors => {
                    largest_match(&document, profile.content_selectors, &noise)
                }
                ExtractionMethod::BodyText => first_match(&document, "body"),
                ExtractionMethod::FallbackMinimal => None,
            };
            let Some(block) = block else {
                tracing::trace!("{}: {} found no content block", url, method);
                continue;
            };

            let Some(markdown) = to_markdown(&clean_html(block, &noise)) else {
                tracing::debug!("{}: {} failed to render markdown", url, method);
                continue;
            };

            if self.passes_quality(&markdown) {
                tracing::debug!("{}: extracted with {}", url, method);
                return self.finish(url, title, markdown, method, false);
            }
            tracing::trace!(
                "{}: {} produced {} chars, below quality bar",
                url,
                method,
                markdown.chars().count()
            );
        }

        let text = clean_text(document.root_element(), &noise);
        tracing::debug!("{}: every method failed; falling back to page text", url);
        self.finish(url, title, text, ExtractionMethod::FallbackMinimal, true)
    }

    fn finish(
        &self,
        url: &Url,
        title: Option<String>,
        markdown: String,
        method: ExtractionMethod,
        low_confidence: bool,
    ) -> ExtractionResult {
        let raw_length = markdown.chars().count();
        ExtractionResult {
            url: url.to_string(),
            title,
            content_markdown: truncate(&markdown, self.max_content_length),
            raw_length,
            method,
            low_confidence,
        }
    }

    /// Length above the minimum and at least one paragraph-like block
    pub fn passes_quality(&self, markdown: &str) -> bool {
        markdown.chars().count() > self.min_content_length && has_paragraph_block(markdown)
    }
}

/// Returns true if some block reads like prose rather than navigation
fn has_paragraph_block(markdown: &str) -> bool {
    markdown.split("\n\n").any(|block| {
        let block = block.trim();
        if block.is_empty() || is_non_prose_line(block) {
            return false;
        }
        block.split_whitespace().count() >= PARAGRAPH_MIN_WORDS
            && block.chars().count() >= PARAGRAPH_MIN_CHARS
    })
}

fn is_non_prose_line(block: &str) -> bool {
    let first = block.chars().next().unwrap_or(' ');
    if matches!(first, '#' | '-' | '*' | '+' | '>' | '|' | '!') {
        return true;
    }
    if block.starts_with("```") {
        return true;
    }
    let ordered_item = block
        .split_once(". ")
        .map(|(n, _)| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(false);
    if ordered_item {
        return true;
    }
    // a lone link
    block.starts_with('[')
        && block.ends_with(')')
        && !block.contains('\n')
        && block.matches("](").count() == 1
}

/// Title: og:title, platform title selectors, h1, then `<title>`
fn select_title(document: &Html, profile: &PlatformProfile) -> Option<String> {
    let og = Selector::parse("meta[property='og:title']")
        .ok()
        .and_then(|s| {
            document
                .select(&s)
                .filter_map(|el| el.value().attr("content"))
                .map(|c| c.trim().to_string())
                .find(|c| !c.is_empty())
        });

    og.or_else(|| {
        profile
            .title_selectors
            .iter()
            .chain(["h1", "title"].iter())
            .find_map(|css| first_match(document, css).and_then(element_text))
    })
}

fn element_text(element: ElementRef<'_>) -> Option<String> {
    let text = element.text().collect::<Vec<_>>().join(" ");
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!text.is_empty()).then_some(text)
}

fn first_match<'a>(document: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    document.select(&selector).next()
}

/// The matching element with the most visible text, across all selectors
fn largest_match<'a>(
    document: &'a Html,
    selectors: &[&str],
    noise: &HashSet<NodeId>,
) -> Option<ElementRef<'a>> {
    let mut best: Option<(ElementRef<'a>, usize)> = None;
    for css in selectors {
        let Ok(selector) = Selector::parse(css) else {
            continue;
        };
        for element in document.select(&selector) {
            let length = clean_text(element, noise).chars().count();
            if length > 0 && best.map_or(true, |(_, top)| length > top) {
                best = Some((element, length));
            }
        }
    }
    best.map(|(element, _)| element)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Platform;

    const STORY: &str = "The committee met on Tuesday to discuss the proposal, which had been \
        circulating for weeks. Members raised concerns about cost, timing, and the lack of \
        public consultation before the vote.";

    fn selector() -> ExtractionStrategySelector {
        ExtractionStrategySelector::new(100, 10_000)
    }

    fn url() -> Url {
        Url::parse("https://example.com/posts/story").unwrap()
    }

    #[test]
    fn test_readability_first() {
        let html = format!(
            r#"<html><head><title>Site | Story</title></head><body>
            <nav><a href="/">Home</a><a href="/about">About</a></nav>
            <div class="content"><h1>The Story</h1><p>{STORY}</p><p>{STORY}</p></div>
            <footer>Copyright</footer></body></html>"#
        );
        let result = selector().extract(&html, &url(), &PlatformFingerprint::generic());

        assert_eq!(result.method, ExtractionMethod::Readability);
        assert!(result.is_usable());
        assert!(result.content_markdown.contains("committee met on Tuesday"));
        assert!(!result.content_markdown.contains("Copyright"));
        assert_eq!(result.title.as_deref(), Some("The Story"));
    }

    #[test]
    fn test_platform_selectors_when_readability_finds_nothing() {
        // Text lives in divs, so no paragraph scores
        let html = format!(
            r#"<html><body><div class="entry-content"><div>{STORY}</div><div>{STORY}</div></div></body></html>"#
        );
        let fingerprint = PlatformFingerprint {
            platform: Platform::WordPress,
            confidence: 0.8,
            signals: Default::default(),
        };
        let result = selector().extract(&html, &url(), &fingerprint);

        assert_eq!(result.method, ExtractionMethod::PlatformSelectors);
        assert!(result.is_usable());
    }

    #[test]
    fn test_body_text_fallback() {
        let html = format!(r#"<html><body><span>{STORY}</span></body></html>"#);
        let result = selector().extract(&html, &url(), &PlatformFingerprint::generic());

        assert_eq!(result.method, ExtractionMethod::BodyText);
        assert!(result.is_usable());
    }

    #[test]
    fn test_fallback_minimal_is_low_confidence() {
        let html = r#"<html><body><ul><li><a href="/a">Home</a></li><li><a href="/b">About</a></li></ul></body></html>"#;
        let result = selector().extract(html, &url(), &PlatformFingerprint::generic());

        assert_eq!(result.method, ExtractionMethod::FallbackMinimal);
        assert!(result.low_confidence);
        assert!(!result.is_usable());
    }

    #[test]
    fn test_malformed_markup_never_panics() {
        for html in ["", "<<<", "<html><body><p>unclosed", "\u{0}<div"] {
            let result = selector().extract(html, &url(), &PlatformFingerprint::generic());
            assert!(!result.is_usable());
        }
    }

    #[test]
    fn test_og_title_wins() {
        let html = format!(
            r#"<html><head><meta property="og:title" content="OG Title"><title>T</title></head>
            <body><h1>H1</h1><p>{STORY}</p></body></html>"#
        );
        let result = selector().extract(&html, &url(), &PlatformFingerprint::generic());
        assert_eq!(result.title.as_deref(), Some("OG Title"));
    }

    #[test]
    fn test_content_truncated_to_max() {
        let html = format!(r#"<html><body><article><p>{STORY}</p><p>{STORY}</p></article></body></html>"#);
        let result = ExtractionStrategySelector::new(50, 120).extract(
            &html,
            &url(),
            &PlatformFingerprint::generic(),
        );
        assert!(result.content_markdown.chars().count() <= 120);
        assert!(result.raw_length > 120);
    }

    #[test]
    fn test_quality_rejects_navigation_only() {
        let nav = "- [Home](/)\n- [About](/about)\n- [Contact](/contact)\n- [Blog](/blog)\n- [Archive](/archive)\n- [Subscribe](/subscribe)";
        assert!(!selector().passes_quality(nav));
        assert!(selector().passes_quality(STORY));
    }
}
