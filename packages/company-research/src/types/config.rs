//! Configuration types for crawling and research.

use std::time::Duration;

/// Default bot-identifying user agent.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (compatible; CompanyResearchBot/1.0; +https://github.com/company-research)";

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Configuration for the crawl engine and frontier selector.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Deepest BFS level to fetch (seed is depth 0).
    ///
    /// Default: 4.
    pub max_depth: usize,

    /// Pages fetched concurrently per batch.
    ///
    /// Default: 10.
    pub batch_size: usize,

    /// Wall-clock budget for a crawl, checked between batches.
    ///
    /// Default: 4 minutes.
    pub timeout: Duration,

    /// Candidates shown to the link selector per depth.
    ///
    /// Default: 150.
    pub max_candidates: usize,

    /// Candidates taken when the selector is unavailable.
    ///
    /// Default: 5.
    pub fallback_count: usize,

    /// Text characters kept per page.
    ///
    /// Default: 20 000.
    pub max_text_chars: usize,

    /// User agent for page fetches.
    pub user_agent: String,

    /// Model used for link selection.
    pub model: String,

    /// Sampling temperature for link selection.
    pub temperature: f32,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_depth: 4,
            batch_size: 10,
            timeout: Duration::from_secs(4 * 60),
            max_candidates: 150,
            fallback_count: 5,
            max_text_chars: 20_000,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.1,
        }
    }
}

impl CrawlConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum depth.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set the batch width. Zero is treated as one.
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// Set the crawl timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the fallback selection size.
    pub fn with_fallback_count(mut self, count: usize) -> Self {
        self.fallback_count = count;
        self
    }

    /// Set the model for link selection.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Configuration for the research loop.
#[derive(Debug, Clone)]
pub struct ResearchConfig {
    /// Hard cap on investigate/validate rounds.
    ///
    /// Default: 2.
    pub max_iterations: usize,

    /// Model used by every research stage.
    pub model: String,

    /// Temperature for planning and completeness checks.
    pub planning_temperature: f32,

    /// Temperature for grounded investigation.
    pub investigation_temperature: f32,

    /// Temperature for identity validation.
    pub validation_temperature: f32,

    /// Characters of each finding shown to the completeness checker.
    pub preview_chars: usize,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            max_iterations: 2,
            model: DEFAULT_MODEL.to_string(),
            planning_temperature: 0.3,
            investigation_temperature: 0.2,
            validation_temperature: 0.1,
            preview_chars: 500,
        }
    }
}

impl ResearchConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the iteration cap. Zero is treated as one.
    pub fn with_max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = iterations.max(1);
        self
    }

    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crawl_defaults() {
        let config = CrawlConfig::default();
        assert_eq!(config.max_depth, 4);
        assert_eq!(config.batch_size, 10);
        assert_eq!(config.timeout, Duration::from_secs(240));
        assert_eq!(config.max_candidates, 150);
        assert_eq!(config.fallback_count, 5);
        assert!(config.user_agent.contains("Bot"));
    }

    #[test]
    fn test_zero_values_are_clamped() {
        assert_eq!(CrawlConfig::new().with_batch_size(0).batch_size, 1);
        assert_eq!(ResearchConfig::new().with_max_iterations(0).max_iterations, 1);
    }
}
