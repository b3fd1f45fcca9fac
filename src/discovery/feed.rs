//! RSS and Atom feed parsing
//!
//! Reads RSS `<item><link>` text and Atom `<entry><link href>` attributes.
//! For Atom entries with several links, `rel="alternate"` (or a link with
//! no rel) wins.

use super::DiscoveryError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use scraper::{Html, Selector};
use url::Url;

/// Feed MIME types advertised through `<link rel="alternate">`
const FEED_TYPES: &[&str] = &["application/rss+xml", "application/atom+xml"];

/// Extracts entry links from an RSS or Atom document, in document order
pub fn parse_feed(xml: &str) -> Result<Vec<String>, DiscoveryError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut links = Vec::new();
    let mut in_entry = false;
    let mut in_link_text = false;
    let mut entry_link: Option<String> = None;
    let mut text = String::new();
    let mut saw_feed_root = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"rss" | b"feed" | b"RDF" => saw_feed_root = true,
                b"item" | b"entry" => {
                    in_entry = true;
                    entry_link = None;
                }
                b"link" if in_entry => {
                    if let Some(href) = atom_href(&e) {
                        entry_link.get_or_insert(href);
                    } else {
                        in_link_text = true;
                        text.clear();
                    }
                }
                _ => {}
            },
            Ok(Event::Empty(e)) => {
                if in_entry && e.local_name().as_ref() == b"link" {
                    if let Some(href) = atom_href(&e) {
                        entry_link.get_or_insert(href);
                    }
                }
            }
            Ok(Event::Text(t)) if in_link_text => {
                let value = t
                    .unescape()
                    .map_err(|e| DiscoveryError::Xml(e.to_string()))?;
                text.push_str(&value);
            }
            Ok(Event::CData(t)) if in_link_text => {
                text.push_str(&String::from_utf8_lossy(&t));
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"link" if in_link_text => {
                    in_link_text = false;
                    let value = text.trim();
                    if !value.is_empty() {
                        entry_link.get_or_insert_with(|| value.to_string());
                    }
                }
                b"item" | b"entry" => {
                    in_entry = false;
                    if let Some(link) = entry_link.take() {
                        links.push(link);
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(DiscoveryError::Xml(e.to_string())),
        }
    }

    if !saw_feed_root {
        return Err(DiscoveryError::NotAFeed);
    }
    Ok(links)
}

/// `href` of an Atom link element that points at the entry itself
fn atom_href(e: &BytesStart<'_>) -> Option<String> {
    let mut href = None;
    let mut rel = None;

    for attr in e.attributes().flatten() {
        match attr.key.local_name().as_ref() {
            b"href" => href = attr.unescape_value().ok().map(|v| v.to_string()),
            b"rel" => rel = attr.unescape_value().ok().map(|v| v.to_string()),
            _ => {}
        }
    }

    match rel.as_deref() {
        None | Some("alternate") => href,
        Some(_) => None,
    }
}

/// Feed URLs advertised in an HTML page's `<head>`
pub fn advertised_feeds(markup: &str, base_url: &Url) -> Vec<Url> {
    let document = Html::parse_document(markup);
    let Ok(selector) = Selector::parse("link[rel='alternate'][href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter(|el| {
            el.value()
                .attr("type")
                .map(|t| FEED_TYPES.contains(&t.trim().to_lowercase().as_str()))
                .unwrap_or(false)
        })
        .filter_map(|el| el.value().attr("href"))
        .filter_map(|href| base_url.join(href.trim()).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rss_items() {
        let xml = r#"<?xml version="1.0"?>
            <rss version="2.0"><channel>
              <title>Blog</title>
              <link>https://example.com/</link>
              <item><title>One</title><link>https://example.com/one</link></item>
              <item><title>Two</title><link><![CDATA[https://example.com/two]]></link></item>
            </channel></rss>"#;

        assert_eq!(
            parse_feed(xml).unwrap(),
            vec![
                "https://example.com/one".to_string(),
                "https://example.com/two".to_string(),
            ]
        );
    }

    #[test]
    fn test_atom_entries_prefer_alternate() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom">
              <link href="https://example.com/" rel="alternate"/>
              <entry>
                <link rel="replies" href="https://example.com/one#comments"/>
                <link rel="alternate" href="https://example.com/one"/>
              </entry>
              <entry><link href="https://example.com/two"/></entry>
            </feed>"#;

        assert_eq!(
            parse_feed(xml).unwrap(),
            vec![
                "https://example.com/one".to_string(),
                "https://example.com/two".to_string(),
            ]
        );
    }

    #[test]
    fn test_html_is_not_a_feed() {
        assert!(matches!(
            parse_feed("<html><body>hi</body></html>"),
            Err(DiscoveryError::NotAFeed)
        ));
    }

    #[test]
    fn test_advertised_feeds() {
        let html = r#"<html><head>
            <link rel="alternate" type="application/rss+xml" href="/feed.xml">
            <link rel="alternate" type="application/atom+xml" href="https://example.com/atom">
            <link rel="alternate" hreflang="de" href="/de/">
            </head></html>"#;
        let base = Url::parse("https://example.com/blog/").unwrap();

        let feeds: Vec<String> = advertised_feeds(html, &base)
            .into_iter()
            .map(|u| u.to_string())
            .collect();
        assert_eq!(
            feeds,
            vec!["https://example.com/feed.xml", "https://example.com/atom"]
        );
    }
}
