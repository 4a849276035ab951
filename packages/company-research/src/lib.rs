//! Automated Company Research
//!
//! Given a web domain, crawls the company's own site, summarizes it into a
//! profile, and runs a bounded research loop that searches third-party
//! sources, checks every citation against the company's identity and
//! decides whether another round is worth it.
//!
//! # Usage
//!
//! ```rust,ignore
//! use company_research::{CrawlEngine, MemoryCacheStore, CrawlConfig};
//! use company_research::testing::{MockFetcher, MockLanguageModel};
//!
//! let engine = CrawlEngine::new(
//!     Arc::new(MockFetcher::new().with_page("https://example.com", html)),
//!     Arc::new(MockLanguageModel::unconfigured()),
//!     Arc::new(MemoryCacheStore::new()),
//!     CrawlConfig::default(),
//! );
//! let result = engine.crawl("example.com", false).await;
//! ```
//!
//! # Modules
//!
//! - [`crawl`] - Depth-bounded crawl engine and AI frontier selector
//! - [`parse`] - HTML page parser and URL normalizer
//! - [`fetch`] - HTTP fetcher
//! - [`research`] - Coordinator, investigator, validator and completeness checker
//! - [`stores`] - Cache store implementations
//! - [`traits`] - Core trait abstractions (LanguageModel, Fetcher, CacheStore)
//! - [`types`] - Data types and configuration
//! - [`testing`] - Mock implementations for testing

pub mod ai;
pub mod config;
pub mod crawl;
pub mod error;
pub mod fetch;
pub mod parse;
pub mod pipeline;
pub mod research;
pub mod security;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use config::PipelineConfig;
pub use crawl::{CrawlEngine, FrontierSelector};
pub use error::{CacheError, FetchError, LlmError, ResearchError, SelectorError};
pub use fetch::HttpFetcher;
pub use parse::normalize_url;
pub use pipeline::{CompanyResearchPipeline, PipelineOutput};
pub use research::Researcher;
pub use security::{LlmCredentials, SecretString};
pub use stores::{FileCacheStore, MemoryCacheStore};
pub use traits::{
    fetcher::{FetchedDocument, Fetcher},
    llm::{LanguageModel, LlmRequest, LlmResponse, LlmTask},
    store::{ArtifactKind, CacheStore},
    summarizer::ProfileSummarizer,
};
pub use types::{
    config::{CrawlConfig, ResearchConfig},
    page::{CrawlResult, LinkCandidate, LinkSection, ScrapedPage},
    research::{
        AgenticResearchData, CompanyProfile, Confidence, Priority, ResearchResult, ResearchTopic,
        UrlVerdict, ValidatedFinding,
    },
};

pub use ai::LlmProfileSummarizer;

#[cfg(feature = "gemini")]
pub use ai::GeminiModel;
