//! Noise and popup removal
//!
//! scraper trees are immutable, so noise is removed at serialization time:
//! the noisy subtrees are collected as a set of node ids, and the serializer
//! skips them while writing a block back out as HTML.

use ego_tree::{NodeId, NodeRef};
use scraper::{ElementRef, Html, Node, Selector};
use std::collections::HashSet;

/// Structural elements that never carry article text
const STRUCTURAL_NOISE: &str =
    "script, style, noscript, template, iframe, svg, canvas, nav, header, footer, aside, form, button, select";

/// Popups, overlays, and promotional widgets
const POPUP_NOISE: &[&str] = &[
    "[aria-modal='true']",
    "[role='dialog']",
    "[role='alertdialog']",
    "[class*='modal']",
    "[class*='popup']",
    "[class*='overlay']",
    "[class*='paywall']",
    "[class*='cookie']",
    "[id*='cookie']",
    "[class*='consent']",
    "[class*='gdpr']",
    "[class*='newsletter']",
    "[class*='subscribe']",
    "[class*='banner']",
    "[class*='sidebar']",
    "[class*='related']",
];

/// Elements that are never treated as noise even if a class pattern matches
const PROTECTED: &[&str] = &["html", "head", "body", "main", "article"];

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Ids of every noise subtree root in `document`
pub fn noise_nodes(document: &Html) -> HashSet<NodeId> {
    let mut noise = HashSet::new();

    let selectors = std::iter::once(STRUCTURAL_NOISE).chain(POPUP_NOISE.iter().copied());
    for css in selectors {
        let Ok(selector) = Selector::parse(css) else {
            continue;
        };
        for element in document.select(&selector) {
            if !PROTECTED.contains(&element.value().name()) {
                noise.insert(element.id());
            }
        }
    }

    noise
}

/// Returns true if `node` or any ancestor is noise
pub fn is_within_noise(node: NodeRef<'_, Node>, noise: &HashSet<NodeId>) -> bool {
    noise.contains(&node.id()) || node.ancestors().any(|a| noise.contains(&a.id()))
}

/// Serializes `element` back to HTML, skipping noise subtrees
pub fn clean_html(element: ElementRef<'_>, noise: &HashSet<NodeId>) -> String {
    let mut out = String::new();
    write_node(*element, noise, &mut out);
    out
}

/// Visible text of `element` outside noise, whitespace-collapsed
pub fn clean_text(element: ElementRef<'_>, noise: &HashSet<NodeId>) -> String {
    let mut words: Vec<&str> = Vec::new();
    for node in element.descendants() {
        if let Node::Text(text) = node.value() {
            if !is_within_noise(node, noise) {
                words.extend(text.split_whitespace());
            }
        }
    }
    words.join(" ")
}

fn write_node(node: NodeRef<'_, Node>, noise: &HashSet<NodeId>, out: &mut String) {
    if noise.contains(&node.id()) {
        return;
    }

    match node.value() {
        Node::Text(text) => escape_into(text, false, out),
        Node::Element(element) => {
            let name = element.name();
            out.push('<');
            out.push_str(name);
            for (key, value) in element.attrs() {
                out.push(' ');
                out.push_str(key);
                out.push_str("=\"");
                escape_into(value, true, out);
                out.push('"');
            }
            out.push('>');

            if VOID_ELEMENTS.contains(&name) {
                return;
            }
            for child in node.children() {
                write_node(child, noise, out);
            }
            out.push_str("</");
            out.push_str(name);
            out.push('>');
        }
        Node::Document | Node::Fragment => {
            for child in node.children() {
                write_node(child, noise, out);
            }
        }
        _ => {}
    }
}

fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(document: &Html) -> ElementRef<'_> {
        let selector = Selector::parse("body").unwrap();
        document.select(&selector).next().unwrap()
    }

    #[test]
    fn test_removes_scripts_and_chrome() {
        let document = Html::parse_document(
            r#"<html><body>
            <nav><a href="/">Home</a></nav>
            <script>var x = 1;</script>
            <p>Real text</p>
            <footer>Copyright</footer>
            </body></html>"#,
        );
        let noise = noise_nodes(&document);
        let text = clean_text(body(&document), &noise);

        assert_eq!(text, "Real text");
    }

    #[test]
    fn test_removes_popups() {
        let document = Html::parse_document(
            r#"<html><body>
            <div class="cookie-banner">We use cookies</div>
            <div role="dialog">Sign up now</div>
            <div class="Newsletter-signup newsletter">Subscribe!</div>
            <p>Story</p>
            </body></html>"#,
        );
        let noise = noise_nodes(&document);
        assert_eq!(clean_text(body(&document), &noise), "Story");
    }

    #[test]
    fn test_body_with_modal_class_is_kept() {
        let document = Html::parse_document(
            r#"<html><body class="modal-open"><article class="overlay-host"><p>Kept</p></article></body></html>"#,
        );
        let noise = noise_nodes(&document);
        assert_eq!(clean_text(body(&document), &noise), "Kept");
    }

    #[test]
    fn test_clean_html_escapes_and_skips_noise() {
        let document = Html::parse_document(
            r#"<html><body><p title="a &quot;b&quot;">x &lt; y<br>z</p><aside>ad</aside></body></html>"#,
        );
        let noise = noise_nodes(&document);
        let html = clean_html(body(&document), &noise);

        assert!(html.starts_with("<body>"));
        assert!(html.contains(r#"<p title="a &quot;b&quot;">x &lt; y<br>z</p>"#));
        assert!(!html.contains("ad</aside>"));
    }
}
