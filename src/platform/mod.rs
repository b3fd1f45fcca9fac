//! Platform fingerprinting
//!
//! Identifies the publishing platform a site runs on from structural
//! signals in the seed page: CSS class patterns, the meta generator tag,
//! URL conventions, and script or CDN hints.
//!
//! Scoring per platform is `matched weight / total weight` from the
//! platform's signal table. The best platform wins if it reaches the
//! configured threshold; otherwise the page is `Generic` with the best
//! score as confidence.

mod profile;
mod signatures;

pub use profile::PlatformProfile;
pub use signatures::{Indicator, Signal};

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use url::Url;

/// Known publishing platforms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Substack,
    Medium,
    WordPress,
    Ghost,
    Generic,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Substack => "substack",
            Self::Medium => "medium",
            Self::WordPress => "wordpress",
            Self::Ghost => "ghost",
            Self::Generic => "generic",
        };
        write!(f, "{}", name)
    }
}

/// Result of fingerprinting one seed page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlatformFingerprint {
    pub platform: Platform,

    /// Always within [0, 1]
    pub confidence: f64,

    /// Names of the indicators that matched
    pub signals: BTreeSet<String>,
}

impl PlatformFingerprint {
    /// A generic fingerprint with no signals
    pub fn generic() -> Self {
        Self {
            platform: Platform::Generic,
            confidence: 0.0,
            signals: BTreeSet::new(),
        }
    }

    pub fn profile(&self) -> &'static PlatformProfile {
        self.platform.profile()
    }
}

/// Pure, infallible platform detector
#[derive(Debug, Clone)]
pub struct PlatformDetector {
    threshold: f64,
}

impl Default for PlatformDetector {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl PlatformDetector {
    /// Creates a detector that accepts platforms scoring at least `threshold`
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold: threshold.clamp(0.0, 1.0),
        }
    }

    /// Fingerprints a page
    ///
    /// # Arguments
    ///
    /// * `markup` - Raw HTML of the page (may be malformed)
    /// * `url` - URL the page was fetched from
    ///
    /// # Returns
    ///
    /// The best-scoring platform, or `Generic` carrying the best score when
    /// no platform reaches the threshold. Ties go to the earlier platform in
    /// the detection order.
    pub fn detect(&self, markup: &str, url: &Url) -> PlatformFingerprint {
        let page = PageView::new(markup, url);

        let mut best = PlatformFingerprint::generic();
        let mut best_platform = Platform::Generic;

        for &platform in signatures::DETECTABLE {
            let total = signatures::total_weight(platform);
            if total <= 0.0 {
                continue;
            }

            let mut matched_weight = 0.0;
            let mut matched = BTreeSet::new();
            for signal in signatures::signals_for(platform) {
                if page.matches(&signal.indicator) {
                    matched_weight += signal.weight;
                    matched.insert(signal.indicator.to_string());
                }
            }

            let confidence = (matched_weight / total).clamp(0.0, 1.0);
            if confidence > best.confidence {
                best_platform = platform;
                best = PlatformFingerprint {
                    platform,
                    confidence,
                    signals: matched,
                };
            }
        }

        if best.confidence < self.threshold {
            tracing::debug!(
                "Best platform guess {} at {:.2} is below threshold {:.2}; using generic",
                best_platform,
                best.confidence,
                self.threshold
            );
            best.platform = Platform::Generic;
        }

        best
    }
}

/// Parsed page plus the lowercase views indicators match against
struct PageView<'a> {
    document: Html,
    markup_lower: String,
    url: &'a Url,
}

impl<'a> PageView<'a> {
    fn new(markup: &str, url: &'a Url) -> Self {
        Self {
            document: Html::parse_document(markup),
            markup_lower: markup.to_lowercase(),
            url,
        }
    }

    fn matches(&self, indicator: &Indicator) -> bool {
        match indicator {
            Indicator::MarkupContains(needle) => self.markup_lower.contains(&needle.to_lowercase()),
            Indicator::Selector(css) => match Selector::parse(css) {
                Ok(selector) => self.document.select(&selector).next().is_some(),
                Err(_) => false,
            },
            Indicator::Generator(needle) => {
                self.attr_contains("meta[name='generator']", "content", needle)
            }
            Indicator::HostSuffix(suffix) => self
                .url
                .host_str()
                .map(|h| h.to_lowercase().ends_with(suffix))
                .unwrap_or(false),
            Indicator::PathContains(needle) => {
                let mut path = self.url.path().to_string();
                if let Some(query) = self.url.query() {
                    path.push('?');
                    path.push_str(query);
                }
                path.contains(needle)
            }
            Indicator::ScriptSource(needle) => self.attr_contains("script[src]", "src", needle),
        }
    }

    fn attr_contains(&self, css: &str, attr: &str, needle: &str) -> bool {
        let Ok(selector) = Selector::parse(css) else {
            return false;
        };
        let needle = needle.to_lowercase();
        self.document.select(&selector).any(|el| {
            el.value()
                .attr(attr)
                .map(|v| v.to_lowercase().contains(&needle))
                .unwrap_or(false)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect(markup: &str, url: &str) -> PlatformFingerprint {
        PlatformDetector::default().detect(markup, &Url::parse(url).unwrap())
    }

    #[test]
    fn test_wordpress_generator() {
        let html = r#"<html><head>
            <meta name="generator" content="WordPress 6.4.2">
            <link rel="stylesheet" href="/wp-content/themes/x/style.css">
            <script src="/wp-includes/js/jquery.js"></script>
            </head><body><p>Hello</p></body></html>"#;
        let fp = detect(html, "https://blog.example.com/");

        assert_eq!(fp.platform, Platform::WordPress);
        assert!((fp.confidence - 0.75).abs() < 1e-9);
        assert!(fp.signals.contains("generator:wordpress"));
        assert!(fp.signals.contains("markup:/wp-content/"));
    }

    #[test]
    fn test_substack_custom_domain() {
        let html = r#"<html><head>
            <link rel="preconnect" href="https://substackcdn.com">
            </head><body><div class="pencraft">post</div></body></html>"#;
        let fp = detect(html, "https://newsletter.example.com/p/hello");

        assert_eq!(fp.platform, Platform::Substack);
        assert!(fp.signals.contains("dom:.pencraft"));
        assert!(fp.signals.contains("path:/p/"));
    }

    #[test]
    fn test_ghost_generator_and_cards() {
        let html = r#"<html><head><meta name="generator" content="Ghost 5.75"></head>
            <body><section class="gh-content"><figure class="kg-card kg-image-card"></figure></section></body></html>"#;
        let fp = detect(html, "https://example.com/");

        assert_eq!(fp.platform, Platform::Ghost);
        assert!((fp.confidence - 8.0 / 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_medium_host_and_cdn() {
        let html = r#"<html><body><img src="https://miro.medium.com/v2/1.png"></body></html>"#;
        let fp = detect(html, "https://medium.com/some-pub/post");
        assert_eq!(fp.platform, Platform::Medium);
    }

    #[test]
    fn test_plain_page_is_generic_at_zero() {
        let html = "<html><head><title>Plain</title></head><body><p>Hi</p></body></html>";
        let fp = detect(html, "https://example.com/");

        assert_eq!(fp.platform, Platform::Generic);
        assert_eq!(fp.confidence, 0.0);
        assert!(fp.signals.is_empty());
    }

    #[test]
    fn test_weak_signal_falls_back_to_generic_keeping_score() {
        // Only the /p/ path hint: 1 of 12 substack weight
        let html = "<html><body><p>Hi</p></body></html>";
        let fp = detect(html, "https://example.com/p/post");

        assert_eq!(fp.platform, Platform::Generic);
        assert!(fp.confidence > 0.0);
        assert!(fp.confidence < 0.5);
        assert!(fp.signals.contains("path:/p/"));
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let html = r#"<html><head><meta name="generator" content="Ghost"></head>
            <body><div class="gh-content"></div></body></html>"#;
        let url = Url::parse("https://example.com/").unwrap();
        // 6 of 12 ghost weight
        let fp = PlatformDetector::new(0.5).detect(html, &url);
        assert_eq!(fp.platform, Platform::Ghost);
        assert!((fp.confidence - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_malformed_markup_never_panics() {
        let inputs = [
            "",
            "<<<>>>",
            "<html><body><div class=",
            "\u{0}\u{1}binary",
            "<script src=",
        ];
        for input in inputs {
            let fp = detect(input, "https://example.com/");
            assert!((0.0..=1.0).contains(&fp.confidence));
        }
    }

    #[test]
    fn test_platform_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Platform::WordPress).unwrap(),
            "\"wordpress\""
        );
        assert_eq!(Platform::Generic.to_string(), "generic");
    }
}
