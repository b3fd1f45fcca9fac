//! Rule-based content classification
//!
//! Each content type has a table of weighted indicators. A type's score is
//! the weighted hit rate of its table; the best type wins and its score is
//! the confidence. When nothing scores at least the configured minimum the
//! verdict is `blog` at the configured default confidence.

mod rules;

pub use rules::{Indicator, Rule};

use crate::config::DetectionConfig;
use crate::extraction::ExtractionResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Content types emitted in `ContentItem.content_type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentType {
    Blog,
    Documentation,
    Tutorial,
    News,
    ApiReference,
    Forum,
    Other,
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Blog => "blog",
            Self::Documentation => "documentation",
            Self::Tutorial => "tutorial",
            Self::News => "news",
            Self::ApiReference => "api-reference",
            Self::Forum => "forum",
            Self::Other => "other",
        };
        write!(f, "{}", name)
    }
}

/// A classifier verdict
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub content_type: ContentType,
    /// Always within [0, 1]
    pub confidence: f64,
}

/// Features of a page that indicators are evaluated against
struct Features {
    path: String,
    text: String,
    words: usize,
    headings: usize,
    code_blocks: usize,
}

impl Features {
    fn new(result: &ExtractionResult, url: &Url) -> Self {
        let markdown = &result.content_markdown;
        let fences = markdown
            .lines()
            .filter(|l| l.trim_start().starts_with("```"))
            .count();
        let headings = markdown
            .lines()
            .filter(|l| l.trim_start().starts_with('#'))
            .count();

        let mut text = markdown.to_lowercase();
        if let Some(title) = &result.title {
            text.push('\n');
            text.push_str(&title.to_lowercase());
        }

        Self {
            path: url.path().to_lowercase(),
            text,
            words: markdown.split_whitespace().count(),
            headings,
            code_blocks: fences / 2,
        }
    }

    fn matches(&self, indicator: &Indicator) -> bool {
        match *indicator {
            Indicator::UrlToken(token) => self.path.contains(token),
            Indicator::DatedPath => has_dated_segment(&self.path),
            Indicator::Vocabulary(phrase) => self.text.contains(phrase),
            Indicator::CodeBlocks(min) => self.code_blocks >= min,
            Indicator::HeadingDensity(per_thousand) => {
                self.words > 0 && (self.headings as f64 * 1000.0 / self.words as f64) >= per_thousand
            }
            Indicator::ShortContent(max_words) => self.words < max_words,
        }
    }
}

fn has_dated_segment(path: &str) -> bool {
    path.split('/').any(|segment| {
        segment.len() == 4
            && segment.chars().all(|c| c.is_ascii_digit())
            && matches!(segment.parse::<u32>(), Ok(1990..=2100))
    })
}

/// Assigns a content type and confidence to extracted content
#[derive(Debug, Clone)]
pub struct ContentClassifier {
    min_score: f64,
    default_confidence: f64,
}

impl Default for ContentClassifier {
    fn default() -> Self {
        Self::new(&DetectionConfig::default())
    }
}

impl ContentClassifier {
    pub fn new(config: &DetectionConfig) -> Self {
        Self {
            min_score: config.classification_min_score,
            default_confidence: config.default_confidence.clamp(0.0, 1.0),
        }
    }

    /// Classifies one extraction result
    ///
    /// Never returns an unclassified verdict; ties go to the earlier type
    /// in the order blog, documentation, tutorial, news, api-reference,
    /// forum, other.
    pub fn classify(&self, result: &ExtractionResult, url: &Url) -> Classification {
        let features = Features::new(result, url);

        let mut best = Classification {
            content_type: ContentType::Blog,
            confidence: 0.0,
        };
        for content_type in rules::CANDIDATES {
            let table = rules::rules_for(content_type);
            let total: f64 = table.iter().map(|r| r.weight).sum();
            if total <= 0.0 {
                continue;
            }
            let hit: f64 = table
                .iter()
                .filter(|r| features.matches(&r.indicator))
                .map(|r| r.weight)
                .sum();
            let score = (hit / total).clamp(0.0, 1.0);
            if score > best.confidence {
                best = Classification {
                    content_type,
                    confidence: score,
                };
            }
        }

        if best.confidence < self.min_score {
            return Classification {
                content_type: ContentType::Blog,
                confidence: self.default_confidence,
            };
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::ExtractionMethod;

    const PROSE: &str = "The team shipped a new release this week with a long list of changes \
        across the codebase. Performance improved in several areas and a number of \
        long-standing bugs were finally closed after months of investigation by the team \
        and the wider community of contributors who raised them.";

    fn result(markdown: &str) -> ExtractionResult {
        ExtractionResult {
            url: String::new(),
            title: None,
            content_markdown: markdown.to_string(),
            raw_length: markdown.len(),
            method: ExtractionMethod::Readability,
            low_confidence: false,
        }
    }

    fn classify(markdown: &str, url: &str) -> Classification {
        ContentClassifier::default().classify(&result(markdown), &Url::parse(url).unwrap())
    }

    fn long(text: &str) -> String {
        std::iter::repeat(text).take(3).collect::<Vec<_>>().join("\n\n")
    }

    #[test]
    fn test_no_signal_defaults_to_blog() {
        let verdict = classify(&long(PROSE), "https://example.com/2fa8c1");
        assert_eq!(verdict.content_type, ContentType::Blog);
        assert!((verdict.confidence - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_docs_path() {
        let markdown = format!("# Install\n\n{}\n\n## Configuration\n\nSee installation notes.", long(PROSE));
        let verdict = classify(&markdown, "https://example.com/docs/setup");
        assert_eq!(verdict.content_type, ContentType::Documentation);
        assert!(verdict.confidence > 0.15);
        assert!(verdict.confidence <= 1.0);
    }

    #[test]
    fn test_api_reference() {
        let markdown = format!(
            "{}\n\n## Parameters\n\n```\nGET /v1/items\n```\n\nThe endpoint returns a list.",
            long(PROSE)
        );
        let verdict = classify(&markdown, "https://example.com/api/items");
        assert_eq!(verdict.content_type, ContentType::ApiReference);
    }

    #[test]
    fn test_tutorial() {
        let markdown = format!("In this tutorial we build a CLI.\n\n{}\n\nStep 1: install.", long(PROSE));
        let verdict = classify(&markdown, "https://example.com/tutorials/cli");
        assert_eq!(verdict.content_type, ContentType::Tutorial);
    }

    #[test]
    fn test_news_dated_path() {
        let markdown = format!("{}\n\nAccording to officials, it was reported late.", long(PROSE));
        let verdict = classify(&markdown, "https://example.com/news/2024/05/budget");
        assert_eq!(verdict.content_type, ContentType::News);
    }

    #[test]
    fn test_substack_post_is_blog() {
        let verdict = classify(&long(PROSE), "https://example.substack.com/p/release-notes");
        assert_eq!(verdict.content_type, ContentType::Blog);
        assert!(verdict.confidence > 0.1);
    }

    #[test]
    fn test_short_about_page_is_other() {
        let verdict = classify("We are a small team.", "https://example.com/about");
        assert_eq!(verdict.content_type, ContentType::Other);
    }

    #[test]
    fn test_content_type_serialization() {
        assert_eq!(
            serde_json::to_string(&ContentType::ApiReference).unwrap(),
            "\"api-reference\""
        );
        assert_eq!(ContentType::Blog.to_string(), "blog");
    }

    #[test]
    fn test_dated_segment() {
        assert!(has_dated_segment("/2024/01/hello"));
        assert!(!has_dated_segment("/posts/12345"));
        assert!(!has_dated_segment("/3000/x"));
    }
}
