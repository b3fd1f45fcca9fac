//! Canonical URL form used as the candidate deduplication key
//!
//! Two links that differ only in host case, fragment, trailing slash, dot
//! segments, tracking parameters, or query order normalize to the same URL.

use crate::UrlError;
use ::url::Url;

/// Query keys that only carry campaign or referral tracking
const TRACKING_KEYS: &[&str] = &[
    "fbclid", "gclid", "mc_eid", "mc_cid", "ref", "ref_src", "source", "igshid",
];

/// Key prefixes that only carry tracking (`utm_source`, `_hsenc`, ...)
const TRACKING_PREFIXES: &[&str] = &["utm_", "_hs"];

/// Parses and normalizes a URL string
///
/// The `www.` prefix is kept so the normalized URL stays fetchable; host
/// comparisons that should ignore it go through [`crate::url::site_key`].
///
/// # Examples
///
/// ```
/// use sumi_sift::url::normalize_url;
///
/// let url = normalize_url("https://EXAMPLE.COM/post/?utm_source=feed").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/post");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;
    normalize_parsed(url)
}

/// Normalizes an already-parsed URL
///
/// # Returns
///
/// * `Ok(Url)` - The canonical form
/// * `Err(UrlError)` - Not HTTP(S), or no host
pub fn normalize_parsed(mut url: Url) -> Result<Url, UrlError> {
    if !matches!(url.scheme(), "http" | "https") {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    let host = url
        .host_str()
        .map(str::to_lowercase)
        .ok_or(UrlError::MissingDomain)?;
    url.set_host(Some(&host))
        .map_err(|e| UrlError::Malformed(format!("Failed to set host: {}", e)))?;

    let path = canonical_path(url.path());
    url.set_path(&path);
    url.set_fragment(None);

    let query = canonical_query(&url);
    url.set_query(query.as_deref());

    Ok(url)
}

/// Resolves dot segments, collapses empty segments, drops the trailing slash
fn canonical_path(path: &str) -> String {
    let segments = path.split('/').fold(Vec::new(), |mut kept, segment| {
        match segment {
            "" | "." => {}
            ".." => {
                kept.pop();
            }
            _ => kept.push(segment),
        }
        kept
    });

    format!("/{}", segments.join("/"))
}

/// Remaining query pairs sorted by key, or None when nothing is left
fn canonical_query(url: &Url) -> Option<String> {
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_tracking_key(key))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    if pairs.is_empty() {
        return None;
    }
    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    Some(
        pairs
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&"),
    )
}

fn is_tracking_key(key: &str) -> bool {
    TRACKING_KEYS.contains(&key) || TRACKING_PREFIXES.iter().any(|p| key.starts_with(p))
}
