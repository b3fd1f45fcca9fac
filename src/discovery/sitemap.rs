//! Sitemap and robots.txt parsing
//!
//! Handles both `<urlset>` sitemaps and `<sitemapindex>` documents, with or
//! without namespace prefixes. Only `<loc>` values are read.

use super::DiscoveryError;
use quick_xml::events::Event;
use quick_xml::Reader;

/// Well-known sitemap locations, tried after robots.txt directives
pub const WELL_KNOWN_SITEMAPS: &[&str] = &["/sitemap.xml", "/sitemap_index.xml"];

/// A parsed sitemap document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SitemapDocument {
    /// `<sitemapindex>`: locations of child sitemaps
    Index(Vec<String>),
    /// `<urlset>`: page locations
    UrlSet(Vec<String>),
}

impl SitemapDocument {
    pub fn len(&self) -> usize {
        match self {
            Self::Index(locs) | Self::UrlSet(locs) => locs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Parses a sitemap or sitemap index
///
/// # Errors
///
/// Returns `DiscoveryError::Xml` for malformed XML and
/// `DiscoveryError::NotASitemap` when the root element is neither
/// `urlset` nor `sitemapindex` (e.g. an HTML error page served as 200).
pub fn parse_sitemap(xml: &str) -> Result<SitemapDocument, DiscoveryError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut root: Option<Vec<u8>> = None;
    let mut in_loc = false;
    let mut current = String::new();
    let mut locs = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.local_name().as_ref().to_vec();
                if root.is_none() {
                    root = Some(name.clone());
                }
                if name == b"loc" {
                    in_loc = true;
                    current.clear();
                }
            }
            Ok(Event::Text(t)) if in_loc => {
                let text = t
                    .unescape()
                    .map_err(|e| DiscoveryError::Xml(e.to_string()))?;
                current.push_str(&text);
            }
            Ok(Event::CData(t)) if in_loc => {
                current.push_str(&String::from_utf8_lossy(&t));
            }
            Ok(Event::End(e)) => {
                if e.local_name().as_ref() == b"loc" {
                    in_loc = false;
                    let loc = current.trim();
                    if !loc.is_empty() {
                        locs.push(loc.to_string());
                    }
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(DiscoveryError::Xml(e.to_string())),
        }
    }

    match root.as_deref() {
        Some(b"sitemapindex") => Ok(SitemapDocument::Index(locs)),
        Some(b"urlset") => Ok(SitemapDocument::UrlSet(locs)),
        Some(other) => Err(DiscoveryError::NotASitemap(
            String::from_utf8_lossy(other).to_string(),
        )),
        None => Err(DiscoveryError::NotASitemap("empty document".to_string())),
    }
}

/// Extracts `Sitemap:` directives from a robots.txt body
pub fn robots_sitemaps(robots_txt: &str) -> Vec<String> {
    robots_txt
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            let (key, value) = line.split_once(':')?;
            if key.trim().eq_ignore_ascii_case("sitemap") {
                let value = value.trim();
                (!value.is_empty()).then(|| value.to_string())
            } else {
                None
            }
        })
        .collect()
}
