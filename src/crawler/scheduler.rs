//! Rank-ordered result collection
//!
//! Candidate links are processed concurrently and finish in any order. The
//! collector buffers each finished item under the rank of its link and hands
//! items back in rank order, so the result sequence follows discovery
//! priority rather than completion order.

use crate::output::ContentItem;
use crate::state::LinkOutcome;
use std::collections::BTreeMap;

/// Order-preserving collector shared by the link tasks of one run
#[derive(Debug)]
pub struct ResultCollector {
    /// Collected items keyed by candidate rank
    items: BTreeMap<usize, ContentItem>,

    /// Final outcome of every finished link, keyed by rank
    outcomes: BTreeMap<usize, LinkOutcome>,

    max_articles: usize,
}

impl ResultCollector {
    /// Creates a collector that is full after `max_articles` items
    pub fn new(max_articles: usize) -> Self {
        Self {
            items: BTreeMap::new(),
            outcomes: BTreeMap::new(),
            max_articles,
        }
    }

    /// Records a collected item for the link at `rank`
    pub fn collect(&mut self, rank: usize, item: ContentItem) {
        self.items.insert(rank, item);
        self.outcomes.insert(rank, LinkOutcome::Collected);
    }

    /// Records a skipped link
    pub fn skip(&mut self, rank: usize, outcome: LinkOutcome) {
        self.outcomes.insert(rank, outcome);
    }

    /// True once `max_articles` items have been collected
    pub fn is_full(&self) -> bool {
        self.items.len() >= self.max_articles
    }

    pub fn collected(&self) -> usize {
        self.items.len()
    }

    /// Outcome recorded for the link at `rank`
    pub fn outcome(&self, rank: usize) -> Option<LinkOutcome> {
        self.outcomes.get(&rank).copied()
    }

    /// Outcomes of every finished link, in rank order
    pub fn outcomes(&self) -> impl Iterator<Item = LinkOutcome> + '_ {
        self.outcomes.values().copied()
    }

    /// Items in rank order, truncated to `max_articles`
    ///
    /// In-flight tasks may finish after the collector filled up; only the
    /// best-ranked items survive.
    pub fn into_items(self) -> Vec<ContentItem> {
        self.items
            .into_values()
            .take(self.max_articles)
            .collect()
    }
}
