//! Environment-driven pipeline configuration.

use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::security::LlmCredentials;
use crate::types::config::{CrawlConfig, ResearchConfig, DEFAULT_MODEL};

/// Default cache directory, relative to the working directory.
pub const DEFAULT_CACHE_DIR: &str = ".cache/company-research";

/// Pipeline configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub credentials: LlmCredentials,
    pub cache_dir: PathBuf,
    pub crawl: CrawlConfig,
    pub research: ResearchConfig,
}

impl PipelineConfig {
    /// Load configuration from environment variables.
    ///
    /// `GEMINI_API_KEY` is optional; without it link selection falls back
    /// and research is skipped.
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let model = env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let credentials = LlmCredentials::from_optional(env::var("GEMINI_API_KEY").ok(), &model);

        let timeout_secs: u64 = env::var("CRAWL_TIMEOUT_SECS")
            .unwrap_or_else(|_| "240".to_string())
            .parse()
            .context("CRAWL_TIMEOUT_SECS must be a whole number of seconds")?;
        let max_depth: usize = env::var("CRAWL_MAX_DEPTH")
            .unwrap_or_else(|_| "4".to_string())
            .parse()
            .context("CRAWL_MAX_DEPTH must be a non-negative integer")?;

        Ok(Self {
            credentials,
            cache_dir: env::var("COMPANY_RESEARCH_CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_CACHE_DIR)),
            crawl: CrawlConfig::default()
                .with_model(&model)
                .with_timeout(Duration::from_secs(timeout_secs))
                .with_max_depth(max_depth),
            research: ResearchConfig::default().with_model(&model),
        })
    }

    /// Override the cache directory.
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }
}
