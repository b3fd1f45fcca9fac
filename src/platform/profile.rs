//! Per-platform strategy table
//!
//! Discovery and extraction dispatch on the detected [`Platform`] through
//! this table instead of branching on platform names.

use super::Platform;

/// Where a platform keeps its content, listings, and feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformProfile {
    /// Selectors for the main content block, most specific first
    pub content_selectors: &'static [&'static str],
    /// Selectors for the article title
    pub title_selectors: &'static [&'static str],
    /// Archive or listing pages worth crawling for links
    pub archive_paths: &'static [&'static str],
    /// Feed locations to probe when the seed page declares none
    pub feed_paths: &'static [&'static str],
    /// Sitemap locations tried after the well-known ones
    pub sitemap_paths: &'static [&'static str],
}

const SUBSTACK: PlatformProfile = PlatformProfile {
    content_selectors: &[".available-content", ".body.markup", ".post-content"],
    title_selectors: &["h1.post-title", ".post-title"],
    archive_paths: &["/archive"],
    feed_paths: &["/feed"],
    sitemap_paths: &[],
};

const MEDIUM: PlatformProfile = PlatformProfile {
    content_selectors: &["article", ".postArticle-content", ".section-content"],
    title_selectors: &[".graf--title", "h1"],
    archive_paths: &["/archive"],
    feed_paths: &["/feed"],
    sitemap_paths: &[],
};

const GHOST: PlatformProfile = PlatformProfile {
    content_selectors: &[".gh-content", ".post-content", ".article-content"],
    title_selectors: &[".article-title", ".post-title", ".gh-article-title"],
    archive_paths: &["/blog"],
    feed_paths: &["/rss"],
    sitemap_paths: &["/sitemap-posts.xml"],
};

const WORDPRESS: PlatformProfile = PlatformProfile {
    content_selectors: &[".entry-content", ".post-content", "article .content"],
    title_selectors: &[".entry-title", ".post-title"],
    archive_paths: &["/blog"],
    feed_paths: &["/feed"],
    sitemap_paths: &["/wp-sitemap.xml", "/post-sitemap.xml"],
};

const GENERIC: PlatformProfile = PlatformProfile {
    content_selectors: &[
        "article",
        "main",
        "[role=main]",
        ".post-content",
        ".entry-content",
        ".article-content",
        ".content",
        "#content",
    ],
    title_selectors: &[".post-title", ".entry-title", ".article-title"],
    archive_paths: &["/blog", "/articles", "/posts"],
    feed_paths: &["/feed", "/rss", "/feed.xml", "/atom.xml", "/index.xml"],
    sitemap_paths: &[],
};

impl Platform {
    /// Strategy table entry for this platform
    pub fn profile(self) -> &'static PlatformProfile {
        match self {
            Platform::Substack => &SUBSTACK,
            Platform::Medium => &MEDIUM,
            Platform::Ghost => &GHOST,
            Platform::WordPress => &WORDPRESS,
            Platform::Generic => &GENERIC,
        }
    }
}
