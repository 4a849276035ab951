//! Profile summarizer trait.
//!
//! Turns a crawl into the [`CompanyProfile`] the research loop starts from.
//! Prose quality is the implementation's concern; the loop only relies on
//! the typed fields.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{page::CrawlResult, research::CompanyProfile};

#[async_trait]
pub trait ProfileSummarizer: Send + Sync {
    /// Summarize a crawl of `domain` into a company profile.
    async fn summarize(&self, domain: &str, crawl: &CrawlResult) -> Result<CompanyProfile>;
}
