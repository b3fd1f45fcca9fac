//! Declarative platform signal tables
//!
//! Each platform is described by a list of weighted indicators. Adding a
//! platform or a new hint is a table edit, not a control-flow change.

use super::Platform;
use std::fmt;

/// One structural hint that a page was built on some platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    /// Case-insensitive substring of the raw markup
    MarkupContains(&'static str),
    /// CSS selector matching at least one element
    Selector(&'static str),
    /// Substring of `<meta name="generator" content="...">`
    Generator(&'static str),
    /// Suffix of the page host
    HostSuffix(&'static str),
    /// Substring of the URL path and query
    PathContains(&'static str),
    /// Substring of any `<script src="...">`
    ScriptSource(&'static str),
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MarkupContains(s) => write!(f, "markup:{}", s),
            Self::Selector(s) => write!(f, "dom:{}", s),
            Self::Generator(s) => write!(f, "generator:{}", s),
            Self::HostSuffix(s) => write!(f, "host:{}", s),
            Self::PathContains(s) => write!(f, "path:{}", s),
            Self::ScriptSource(s) => write!(f, "script:{}", s),
        }
    }
}

/// A weighted indicator
#[derive(Debug, Clone, Copy)]
pub struct Signal {
    pub indicator: Indicator,
    pub weight: f64,
}

const fn signal(indicator: Indicator, weight: f64) -> Signal {
    Signal { indicator, weight }
}

use Indicator::*;

const SUBSTACK: &[Signal] = &[
    signal(HostSuffix("substack.com"), 3.0),
    signal(MarkupContains("substackcdn.com"), 3.0),
    signal(Selector(".pencraft"), 2.0),
    signal(Selector(".post-preview"), 1.0),
    signal(Selector(".subscribe-button, .subscribe-widget"), 1.0),
    signal(PathContains("/p/"), 1.0),
    signal(MarkupContains("substack-frontend"), 1.0),
];

const MEDIUM: &[Signal] = &[
    signal(HostSuffix("medium.com"), 3.0),
    signal(MarkupContains("miro.medium.com"), 3.0),
    signal(Selector(".postArticle, .streamItem, .js-postStream"), 2.0),
    signal(
        Selector("meta[property='al:android:package'][content='com.medium.reader']"),
        2.0,
    ),
    signal(PathContains("/@"), 1.0),
];

const GHOST: &[Signal] = &[
    signal(Generator("ghost"), 4.0),
    signal(ScriptSource("ghost"), 2.0),
    signal(Selector(".gh-content, .gh-head, .gh-article"), 2.0),
    signal(Selector(".kg-card, .kg-image-card"), 2.0),
    signal(HostSuffix("ghost.io"), 2.0),
];

const WORDPRESS: &[Signal] = &[
    signal(Generator("wordpress"), 4.0),
    signal(MarkupContains("/wp-content/"), 3.0),
    signal(MarkupContains("/wp-includes/"), 2.0),
    signal(Selector("[class*='wp-block']"), 1.0),
    signal(Selector("link[rel='https://api.w.org/']"), 1.0),
    signal(HostSuffix("wordpress.com"), 1.0),
];

/// Platforms that can be fingerprinted, in tie-break order
pub const DETECTABLE: &[Platform] = &[
    Platform::Substack,
    Platform::Medium,
    Platform::Ghost,
    Platform::WordPress,
];

/// Signal table of a platform (empty for Generic)
pub fn signals_for(platform: Platform) -> &'static [Signal] {
    match platform {
        Platform::Substack => SUBSTACK,
        Platform::Medium => MEDIUM,
        Platform::Ghost => GHOST,
        Platform::WordPress => WORDPRESS,
        Platform::Generic => &[],
    }
}

/// Sum of all weights in a platform's table
pub fn total_weight(platform: Platform) -> f64 {
    signals_for(platform).iter().map(|s| s.weight).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Selector as CssSelector;

    #[test]
    fn test_every_detectable_platform_has_signals() {
        for platform in DETECTABLE {
            assert!(!signals_for(*platform).is_empty(), "{} has no signals", platform);
            assert!(total_weight(*platform) > 0.0);
        }
        assert!(signals_for(Platform::Generic).is_empty());
    }

    #[test]
    fn test_selector_indicators_parse() {
        for platform in DETECTABLE {
            for signal in signals_for(*platform) {
                if let Indicator::Selector(css) = signal.indicator {
                    assert!(CssSelector::parse(css).is_ok(), "bad selector {}", css);
                }
            }
        }
    }

    #[test]
    fn test_indicator_names() {
        assert_eq!(Indicator::Generator("ghost").to_string(), "generator:ghost");
        assert_eq!(Indicator::Selector(".pencraft").to_string(), "dom:.pencraft");
    }
}
