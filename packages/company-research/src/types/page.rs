//! Crawl types - scraped pages, link candidates, and the crawl result.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A page fetched and parsed during a crawl.
///
/// Deliberately carries no raw markup: cached results written by older
/// versions may contain an `html` field, which is dropped on deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapedPage {
    /// URL the page was fetched from
    pub url: String,

    /// Document title (empty when the page has none)
    #[serde(default)]
    pub title: String,

    /// Visible text content
    #[serde(default)]
    pub text_content: String,

    /// BFS level at which the page was discovered (0 = seed)
    pub depth: usize,
}

impl ScrapedPage {
    /// Create a new scraped page.
    pub fn new(
        url: impl Into<String>,
        title: impl Into<String>,
        text_content: impl Into<String>,
        depth: usize,
    ) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            text_content: text_content.into(),
            depth,
        }
    }
}

/// Structural region of the page a link was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkSection {
    Nav,
    Main,
    Header,
    Footer,
    #[default]
    Other,
}

impl LinkSection {
    /// Lower-case label used in prompts and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nav => "nav",
            Self::Main => "main",
            Self::Header => "header",
            Self::Footer => "footer",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for LinkSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An outbound link that could be fetched at the next depth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkCandidate {
    /// Normalized URL
    pub url: String,

    /// Anchor text (whitespace-collapsed)
    #[serde(default)]
    pub anchor_text: String,

    /// Section the link was found in
    #[serde(default)]
    pub section: LinkSection,
}

impl LinkCandidate {
    /// Create a candidate with section context.
    pub fn new(
        url: impl Into<String>,
        anchor_text: impl Into<String>,
        section: LinkSection,
    ) -> Self {
        Self {
            url: url.into(),
            anchor_text: anchor_text.into(),
            section,
        }
    }

    /// Create a candidate without section context.
    pub fn flat(url: impl Into<String>) -> Self {
        Self::new(url, "", LinkSection::Other)
    }
}

/// Result of one crawl run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlResult {
    /// Domain the crawl was started for
    pub domain: String,

    /// Number of pages in `pages`
    pub page_count: usize,

    /// Pages in fetch order
    #[serde(default)]
    pub pages: Vec<ScrapedPage>,

    /// Set when the seed page could not be fetched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Set when served from the cache
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached: Option<bool>,
}

impl CrawlResult {
    /// Create an empty result for a domain.
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            ..Default::default()
        }
    }

    /// Create an empty result carrying an error.
    pub fn failed(domain: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            error: Some(error.into()),
            ..Default::default()
        }
    }

    /// Append a page and keep `page_count` in sync.
    pub fn push_page(&mut self, page: ScrapedPage) {
        self.pages.push(page);
        self.page_count = self.pages.len();
    }

    /// Mark the result as served from the cache.
    pub fn into_cached(mut self) -> Self {
        self.cached = Some(true);
        self.page_count = self.pages.len();
        self
    }

    /// Whether the crawl failed at the seed.
    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}
