//! Interstitial page detection
//!
//! Some responses stand in front of the real content: meta-refresh redirect
//! stubs, "please wait" browser checks, and terms walls. They carry no
//! article, so they are recognised before extraction and never become items.

use scraper::{ElementRef, Html, Node, Selector};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Visible body text below this length counts as a stub page
const SHORT_PAGE_CHARS: usize = 600;

/// Titles of browser checks and redirect stubs (matched as prefixes)
const CHALLENGE_TITLES: &[&str] = &[
    "just a moment",
    "please wait",
    "one moment",
    "attention required",
    "checking your browser",
    "ddos protection",
];

const REDIRECT_TITLES: &[&str] = &["redirecting", "redirect notice", "you are being redirected"];

const TERMS_TITLES: &[&str] = &["terms of use", "terms of service", "terms and conditions"];

/// Phrases that mark a short page as a browser check or redirect stub
const CHALLENGE_PHRASES: &[&str] = &[
    "please wait",
    "checking your browser",
    "enable javascript and cookies to continue",
    "you will be redirected",
    "you are being redirected",
    "redirecting",
    "loading...",
];

/// A short page mentioning terms and one of these asks for consent
const AGREEMENT_PHRASES: &[&str] = &["i agree", "accept", "agree and continue", "continue"];

/// Text inside these elements is never visible
const INVISIBLE: &[&str] = &["script", "style", "noscript", "template"];

/// What kind of page stands in front of the content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InterstitialKind {
    /// Meta-refresh or "redirecting" stub
    Redirect,
    /// "Please wait" or browser-check page
    Challenge,
    /// Terms of use or consent wall
    TermsWall,
}

impl fmt::Display for InterstitialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Redirect => "redirect page",
            Self::Challenge => "browser check",
            Self::TermsWall => "terms wall",
        };
        write!(f, "{}", s)
    }
}

/// A detected interstitial
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interstitial {
    pub kind: InterstitialKind,
    /// Meta-refresh target as written in the page, if any
    pub target: Option<String>,
}

impl Interstitial {
    fn new(kind: InterstitialKind) -> Self {
        Self { kind, target: None }
    }
}

/// Recognises redirect stubs, browser checks, and terms walls
///
/// # Returns
///
/// * `Some(Interstitial)` - The page stands in front of the content
/// * `None` - The page may carry content
pub fn detect_interstitial(markup: &str) -> Option<Interstitial> {
    let document = Html::parse_document(markup);

    if let Some(target) = refresh_target(&document) {
        return Some(Interstitial {
            kind: InterstitialKind::Redirect,
            target: Some(target),
        });
    }

    let title = page_title(&document);
    let text = visible_text(&document).to_lowercase();
    let short = text.chars().count() < SHORT_PAGE_CHARS;

    if TERMS_TITLES.iter().any(|t| title.starts_with(t)) {
        return Some(Interstitial::new(InterstitialKind::TermsWall));
    }
    if short {
        if REDIRECT_TITLES.iter().any(|t| title.starts_with(t)) {
            return Some(Interstitial::new(InterstitialKind::Redirect));
        }
        if CHALLENGE_TITLES.iter().any(|t| title.starts_with(t)) {
            return Some(Interstitial::new(InterstitialKind::Challenge));
        }
        if CHALLENGE_PHRASES.iter().any(|p| text.contains(p)) {
            return Some(Interstitial::new(InterstitialKind::Challenge));
        }
        let mentions_terms = TERMS_TITLES.iter().any(|p| text.contains(p));
        if mentions_terms && AGREEMENT_PHRASES.iter().any(|p| text.contains(p)) {
            return Some(Interstitial::new(InterstitialKind::TermsWall));
        }
    }

    None
}

/// `url=` part of a `<meta http-equiv="refresh">` tag
fn refresh_target(document: &Html) -> Option<String> {
    let selector = Selector::parse("meta[http-equiv]").ok()?;
    document
        .select(&selector)
        .filter(|meta| {
            meta.value()
                .attr("http-equiv")
                .is_some_and(|v| v.trim().eq_ignore_ascii_case("refresh"))
        })
        .filter_map(|meta| meta.value().attr("content"))
        .find_map(|content| {
            content.split(';').find_map(|part| {
                let part = part.trim();
                let (key, value) = part.split_once('=')?;
                if !key.trim().eq_ignore_ascii_case("url") {
                    return None;
                }
                let value = value.trim().trim_matches(|c| c == '\'' || c == '"');
                (!value.is_empty()).then(|| value.to_string())
            })
        })
}

fn page_title(document: &Html) -> String {
    Selector::parse("title")
        .ok()
        .and_then(|s| document.select(&s).next())
        .map(|t| t.text().collect::<String>().trim().to_lowercase())
        .unwrap_or_default()
}

/// Whitespace-collapsed body text outside scripts and styles
fn visible_text(document: &Html) -> String {
    let Some(body) = Selector::parse("body")
        .ok()
        .and_then(|s| document.select(&s).next())
    else {
        return String::new();
    };

    let mut words: Vec<&str> = Vec::new();
    for node in body.descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|el| INVISIBLE.contains(&el.value().name()));
        if !hidden {
            words.extend(text.split_whitespace());
        }
    }
    words.join(" ")
}
