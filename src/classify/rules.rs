//! Content-type indicator tables

use super::ContentType;

/// One observable hint about a page's content type
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Indicator {
    /// Substring of the lowercased URL path
    UrlToken(&'static str),
    /// A `/YYYY/` or `/YYYY/MM/` segment in the path
    DatedPath,
    /// Phrase in the lowercased content
    Vocabulary(&'static str),
    /// At least this many fenced code blocks
    CodeBlocks(usize),
    /// At least this many headings per 1000 words
    HeadingDensity(f64),
    /// Fewer than this many words
    ShortContent(usize),
}

/// A weighted indicator
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub indicator: Indicator,
    pub weight: f64,
}

const fn rule(indicator: Indicator, weight: f64) -> Rule {
    Rule { indicator, weight }
}

use Indicator::*;

const BLOG: &[Rule] = &[
    rule(UrlToken("/blog"), 2.0),
    rule(UrlToken("/p/"), 2.0),
    rule(UrlToken("/post"), 1.0),
    rule(Vocabulary("i think"), 1.0),
    rule(Vocabulary("subscribe"), 0.5),
    rule(Vocabulary("thanks for reading"), 0.5),
];

const DOCUMENTATION: &[Rule] = &[
    rule(UrlToken("/docs"), 3.0),
    rule(UrlToken("/documentation"), 2.0),
    rule(UrlToken("/manual"), 1.0),
    rule(HeadingDensity(8.0), 2.0),
    rule(CodeBlocks(1), 1.0),
    rule(Vocabulary("installation"), 1.0),
    rule(Vocabulary("configuration"), 1.0),
];

const TUTORIAL: &[Rule] = &[
    rule(UrlToken("/tutorial"), 3.0),
    rule(UrlToken("/guide"), 2.0),
    rule(UrlToken("how-to"), 2.0),
    rule(UrlToken("/learn"), 1.0),
    rule(Vocabulary("in this tutorial"), 2.0),
    rule(Vocabulary("step 1"), 1.5),
    rule(CodeBlocks(2), 1.0),
];

const NEWS: &[Rule] = &[
    rule(UrlToken("/news"), 3.0),
    rule(DatedPath, 1.0),
    rule(Vocabulary("according to"), 1.0),
    rule(Vocabulary("reported"), 1.0),
    rule(Vocabulary("press release"), 1.0),
    rule(Vocabulary("said on"), 1.0),
];

const API_REFERENCE: &[Rule] = &[
    rule(UrlToken("/api"), 3.0),
    rule(UrlToken("/reference"), 2.0),
    rule(CodeBlocks(3), 1.0),
    rule(Vocabulary("parameters"), 1.5),
    rule(Vocabulary("endpoint"), 1.5),
    rule(Vocabulary("returns"), 1.0),
    rule(Vocabulary("status code"), 1.0),
];

const FORUM: &[Rule] = &[
    rule(UrlToken("/forum"), 3.0),
    rule(UrlToken("/thread"), 2.0),
    rule(UrlToken("/questions"), 2.0),
    rule(UrlToken("/t/"), 1.0),
    rule(Vocabulary("posted by"), 1.0),
    rule(Vocabulary("reply"), 1.0),
    rule(Vocabulary("upvote"), 1.0),
];

const OTHER: &[Rule] = &[
    rule(ShortContent(80), 2.0),
    rule(UrlToken("/about"), 1.5),
    rule(UrlToken("/contact"), 1.5),
    rule(UrlToken("/interview"), 1.0),
];

/// Candidate types in tie-break order
pub const CANDIDATES: [ContentType; 7] = [
    ContentType::Blog,
    ContentType::Documentation,
    ContentType::Tutorial,
    ContentType::News,
    ContentType::ApiReference,
    ContentType::Forum,
    ContentType::Other,
];

pub fn rules_for(content_type: ContentType) -> &'static [Rule] {
    match content_type {
        ContentType::Blog => BLOG,
        ContentType::Documentation => DOCUMENTATION,
        ContentType::Tutorial => TUTORIAL,
        ContentType::News => NEWS,
        ContentType::ApiReference => API_REFERENCE,
        ContentType::Forum => FORUM,
        ContentType::Other => OTHER,
    }
}
