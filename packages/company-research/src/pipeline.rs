//! End-to-end pipeline: crawl, summarize, research.

use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::ai::LlmProfileSummarizer;
use crate::crawl::CrawlEngine;
use crate::research::Researcher;
use crate::traits::fetcher::Fetcher;
use crate::traits::llm::LanguageModel;
use crate::traits::store::{load_artifact, save_artifact, ArtifactKind, CacheStore};
use crate::traits::summarizer::ProfileSummarizer;
use crate::types::config::{CrawlConfig, ResearchConfig};
use crate::types::page::CrawlResult;
use crate::types::research::{AgenticResearchData, CompanyProfile};

/// Everything one pipeline run produced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineOutput {
    pub crawl: CrawlResult,

    /// Absent when the crawl found nothing or summarization failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<CompanyProfile>,

    /// Absent when research was skipped or aborted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub research: Option<AgenticResearchData>,
}

/// Wires the crawl engine, a profile summarizer and the research loop
/// around one shared cache.
///
/// # Example
///
/// ```rust,ignore
/// use company_research::{CompanyResearchPipeline, FileCacheStore, HttpFetcher};
///
/// let pipeline = CompanyResearchPipeline::new(
///     Arc::new(HttpFetcher::new()?),
///     llm,
///     Arc::new(FileCacheStore::new(".cache/company-research")),
///     CrawlConfig::default(),
///     ResearchConfig::default(),
/// );
/// let output = pipeline.run("example.com", false).await;
/// ```
pub struct CompanyResearchPipeline {
    engine: CrawlEngine,
    summarizer: Arc<dyn ProfileSummarizer>,
    researcher: Researcher,
    cache: Arc<dyn CacheStore>,
}

impl CompanyResearchPipeline {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        llm: Arc<dyn LanguageModel>,
        cache: Arc<dyn CacheStore>,
        crawl_config: CrawlConfig,
        research_config: ResearchConfig,
    ) -> Self {
        let summarizer = Arc::new(LlmProfileSummarizer::new(llm.clone(), &research_config.model));
        Self {
            engine: CrawlEngine::new(fetcher.clone(), llm.clone(), cache.clone(), crawl_config),
            researcher: Researcher::new(llm, fetcher, cache.clone(), research_config),
            summarizer,
            cache,
        }
    }

    /// Replace the profile summarizer.
    pub fn with_summarizer(mut self, summarizer: Arc<dyn ProfileSummarizer>) -> Self {
        self.summarizer = summarizer;
        self
    }

    pub fn engine(&self) -> &CrawlEngine {
        &self.engine
    }

    pub fn researcher(&self) -> &Researcher {
        &self.researcher
    }

    /// Crawl only.
    pub async fn crawl(&self, domain: &str, bypass_cache: bool) -> CrawlResult {
        self.engine.crawl(domain, bypass_cache).await
    }

    /// Summarize a crawl into a profile, cached for a day.
    pub async fn profile(
        &self,
        domain: &str,
        crawl: &CrawlResult,
        bypass_cache: bool,
    ) -> Option<CompanyProfile> {
        if !bypass_cache {
            if let Some(profile) =
                load_artifact::<CompanyProfile>(self.cache.as_ref(), domain, ArtifactKind::Profile)
                    .await
            {
                return Some(profile);
            }
        }

        match self.summarizer.summarize(domain, crawl).await {
            Ok(profile) => {
                save_artifact(self.cache.as_ref(), domain, ArtifactKind::Profile, &profile).await;
                Some(profile)
            }
            Err(e) => {
                warn!(domain = %domain, error = %e, "Profile summarization failed");
                None
            }
        }
    }

    /// Crawl, summarize and research `domain`.
    pub async fn run(&self, domain: &str, bypass_cache: bool) -> PipelineOutput {
        let crawl = self.crawl(domain, bypass_cache).await;
        if crawl.is_failed() || crawl.pages.is_empty() {
            warn!(domain = %domain, error = ?crawl.error, "Nothing crawled, skipping research");
            return PipelineOutput {
                crawl,
                profile: None,
                research: None,
            };
        }

        let profile = self.profile(domain, &crawl, bypass_cache).await;
        let research = match &profile {
            Some(profile) => self.researcher.research(domain, profile, bypass_cache).await,
            None => None,
        };

        info!(
            domain = %domain,
            pages = crawl.page_count,
            has_profile = profile.is_some(),
            findings = research.as_ref().map(|r| r.validated_findings.len()).unwrap_or(0),
            "Pipeline complete"
        );

        PipelineOutput {
            crawl,
            profile,
            research,
        }
    }
}
