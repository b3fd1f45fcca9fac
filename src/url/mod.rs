//! URL handling module for Sumi-Sift
//!
//! This module provides URL normalization (the candidate deduplication key),
//! per-host keys, and same-site checks.

mod domain;
mod normalize;

// Re-export main functions
pub use domain::{host_key, is_same_site, site_key};
pub use normalize::{normalize_parsed, normalize_url};

use ::url::Url;

/// Resolves an href against a base URL and normalizes the result
///
/// Returns None for links that should never be followed:
/// - empty or fragment-only hrefs
/// - `javascript:`, `mailto:`, `tel:`, and `data:` schemes
/// - anything that does not resolve to an HTTP(S) URL
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    let absolute = base_url.join(href).ok()?;
    normalize_parsed(absolute).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://example.com/blog/").unwrap()
    }

    #[test]
    fn test_resolve_relative_link() {
        let url = resolve_link("post-one/", &base_url()).unwrap();
        assert_eq!(url.as_str(), "https://example.com/blog/post-one");
    }

    #[test]
    fn test_resolve_root_relative_link() {
        let url = resolve_link("/p/hello?utm_source=x", &base_url()).unwrap();
        assert_eq!(url.as_str(), "https://example.com/p/hello");
    }

    #[test]
    fn test_skip_special_schemes() {
        assert!(resolve_link("javascript:void(0)", &base_url()).is_none());
        assert!(resolve_link("MAILTO:a@example.com", &base_url()).is_none());
        assert!(resolve_link("tel:+1", &base_url()).is_none());
        assert!(resolve_link("data:text/html,hi", &base_url()).is_none());
        assert!(resolve_link("ftp://example.com/file", &base_url()).is_none());
    }

    #[test]
    fn test_skip_fragment_and_empty() {
        assert!(resolve_link("#comments", &base_url()).is_none());
        assert!(resolve_link("   ", &base_url()).is_none());
    }
}
