//! Content-path heuristic
//!
//! Decides whether a same-site URL looks like an article rather than a
//! listing, account, or asset page.

use url::Url;

/// Path segments that mark listing, account, or utility pages
const NON_CONTENT_SEGMENTS: &[&str] = &[
    "tag",
    "tags",
    "category",
    "categories",
    "author",
    "authors",
    "page",
    "login",
    "signin",
    "sign-in",
    "signup",
    "sign-up",
    "register",
    "account",
    "search",
    "subscribe",
    "feed",
    "rss",
    "privacy",
    "privacy-policy",
    "terms",
    "terms-of-service",
    "wp-admin",
    "wp-login.php",
    "wp-json",
    "cart",
    "checkout",
];

/// File extensions of static assets
const ASSET_EXTENSIONS: &[&str] = &[
    "css", "js", "mjs", "map", "png", "jpg", "jpeg", "gif", "svg", "webp", "ico", "avif", "woff",
    "woff2", "ttf", "otf", "eot", "pdf", "zip", "gz", "tar", "rar", "7z", "xml", "json", "mp3",
    "mp4", "webm", "mov", "avi", "wav", "ogg",
];

/// Query keys that mark pagination or search
const NON_CONTENT_QUERY_KEYS: &[&str] = &["page", "paged", "s", "q", "search", "replytocom"];

/// Returns true if `url` plausibly points at a content page
pub fn looks_like_content(url: &Url) -> bool {
    let path = url.path().to_lowercase();

    if path == "/" || path.is_empty() {
        return false;
    }

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments
        .iter()
        .any(|segment| NON_CONTENT_SEGMENTS.contains(segment))
    {
        return false;
    }

    if let Some(last) = segments.last() {
        if let Some((_, ext)) = last.rsplit_once('.') {
            if ASSET_EXTENSIONS.contains(&ext) {
                return false;
            }
        }
    }

    !url.query_pairs()
        .any(|(key, _)| NON_CONTENT_QUERY_KEYS.contains(&key.to_lowercase().as_str()))
}

/// Returns true if a child sitemap URL looks like a taxonomy listing
pub fn is_taxonomy_sitemap(url: &Url) -> bool {
    let path = url.path().to_lowercase();
    ["tag", "category", "author", "taxonomies", "users"]
        .iter()
        .any(|kind| path.contains(kind))
}
