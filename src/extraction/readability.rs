//! Paragraph-scoring content heuristic
//!
//! Every paragraph-like element with enough text scores
//! `1 + commas + min(len / 100, 3)`. The score is credited to its parent in
//! full and to its grandparent at half. Each credited container's total is
//! then scaled by `1 - link_density`, and the best container wins.

use super::cleanup::{clean_text, is_within_noise};
use ego_tree::NodeId;
use scraper::{ElementRef, Html, Selector};
use std::collections::{HashMap, HashSet};

/// Paragraphs shorter than this do not score
const MIN_PARAGRAPH_CHARS: usize = 25;

/// Picks the highest-scoring content container, if any paragraph scored
pub fn best_container<'a>(document: &'a Html, noise: &HashSet<NodeId>) -> Option<ElementRef<'a>> {
    let paragraph = Selector::parse("p, pre, td, blockquote").ok()?;
    let mut scores: HashMap<NodeId, f64> = HashMap::new();
    let mut order: Vec<NodeId> = Vec::new();
    let mut credit = |id: NodeId, amount: f64| {
        *scores.entry(id).or_insert_with(|| {
            order.push(id);
            0.0
        }) += amount;
    };

    for element in document.select(&paragraph) {
        if is_within_noise(*element, noise) {
            continue;
        }

        let text = clean_text(element, noise);
        let length = text.chars().count();
        if length < MIN_PARAGRAPH_CHARS {
            continue;
        }

        let commas = text.matches(',').count() as f64;
        let score = 1.0 + commas + (length as f64 / 100.0).min(3.0);

        let mut ancestors = element.ancestors().filter(|n| n.value().is_element());
        if let Some(parent) = ancestors.next() {
            credit(parent.id(), score);
            if let Some(grandparent) = ancestors.next() {
                credit(grandparent.id(), score / 2.0);
            }
        }
    }

    let anchor = Selector::parse("a").ok()?;
    let mut best: Option<(ElementRef<'a>, f64)> = None;
    // first container credited wins ties
    for id in order {
        let Some(element) = document.tree.get(id).and_then(ElementRef::wrap) else {
            continue;
        };
        let score = scores.get(&id).copied().unwrap_or(0.0)
            * (1.0 - link_density(element, &anchor, noise));
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((element, score));
        }
    }

    best.filter(|(_, score)| *score > 0.0).map(|(element, _)| element)
}

/// Share of an element's text that sits inside links
fn link_density(element: ElementRef<'_>, anchor: &Selector, noise: &HashSet<NodeId>) -> f64 {
    let total = clean_text(element, noise).chars().count();
    if total == 0 {
        return 1.0;
    }
    let linked: usize = element
        .select(anchor)
        .filter(|a| !is_within_noise(**a, noise))
        .map(|a| clean_text(a, noise).chars().count())
        .sum();
    (linked as f64 / total as f64).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::cleanup::noise_nodes;

    #[test]
    fn test_prefers_dense_prose_over_link_lists() {
        let html = r#"<html><body>
            <div id="links">
              <p><a href="/a">A long link text that goes on and on, and on</a></p>
              <p><a href="/b">Another long link text, padded out for length</a></p>
            </div>
            <div id="story">
              <p>The first paragraph of the story, with commas, clauses, and plenty of words.</p>
              <p>A second paragraph continues the narrative, adding detail, colour, and length.</p>
            </div>
            </body></html>"#;
        let document = Html::parse_document(html);
        let noise = noise_nodes(&document);

        let best = best_container(&document, &noise).unwrap();
        assert_eq!(best.value().attr("id"), Some("story"));
    }

    #[test]
    fn test_no_paragraphs_yields_none() {
        let document = Html::parse_document("<html><body><div>short</div></body></html>");
        let noise = noise_nodes(&document);
        assert!(best_container(&document, &noise).is_none());
    }

    #[test]
    fn test_paragraphs_inside_noise_ignored() {
        let html = r#"<html><body>
            <aside><p>Sidebar text that is long enough to score, with commas, many.</p></aside>
            </body></html>"#;
        let document = Html::parse_document(html);
        let noise = noise_nodes(&document);
        assert!(best_container(&document, &noise).is_none());
    }
}
