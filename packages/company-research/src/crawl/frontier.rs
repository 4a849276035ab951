//! AI frontier selector.
//!
//! Shows a depth's link candidates to the language model as a numbered list
//! and keeps the ones it picks. Without a credential, or when the call
//! fails, the first few candidates are taken instead so the crawl always
//! makes progress.

use regex::Regex;
use std::collections::HashSet;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, warn};

use crate::error::SelectorError;
use crate::traits::llm::{LanguageModel, LlmRequest, LlmTask};
use crate::types::config::CrawlConfig;
use crate::types::page::LinkCandidate;

const SELECT_LINKS_PROMPT: &str = r#"You are choosing which pages of a company website to read next while researching the company.

What this round should find: {purpose}

{section_rules}Always exclude:
- links to other websites
- document and file downloads (PDF, images, archives)
- login, sign-up, account and shopping-cart pages
- privacy policy, terms of use and other legal pages

Candidate links:
{candidates}

Answer with the numbers of the links worth reading, comma-separated (for example: 1, 4, 7). Answer with numbers only."#;

const SECTION_RULES: &str = r#"Each link is labelled with the page section it was found in. Use the labels as follows:
- prefer [main] links
- [other] links are acceptable
- keep [header] and [nav] links to a minimum
- never choose [footer] links

"#;

/// What each crawl depth is looking for.
pub fn depth_purpose(depth: usize) -> &'static str {
    match depth {
        0 | 1 => "company information, products and services, technical capability",
        2 => "detailed product or service pages, case studies, team and company history",
        3 => "project references, certifications and awards, partners and clients",
        _ => "any remaining concrete facts about the company's business, scale and track record",
    }
}

fn index_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\d+").expect("static regex"))
}

/// Parse a model answer into zero-based candidate indices.
///
/// Numbers outside `1..=count` are dropped, as are repeats; order follows
/// the answer.
pub fn parse_indices(answer: &str, count: usize) -> Vec<usize> {
    let mut seen = HashSet::new();
    index_pattern()
        .find_iter(answer)
        .filter_map(|m| m.as_str().parse::<usize>().ok())
        .filter(|n| (1..=count).contains(n))
        .map(|n| n - 1)
        .filter(|i| seen.insert(*i))
        .collect()
}

/// Picks which candidates to fetch at each depth.
#[derive(Clone)]
pub struct FrontierSelector {
    llm: Arc<dyn LanguageModel>,
    model: String,
    temperature: f32,
    max_candidates: usize,
    fallback_count: usize,
}

impl FrontierSelector {
    pub fn new(llm: Arc<dyn LanguageModel>, config: &CrawlConfig) -> Self {
        Self {
            llm,
            model: config.model.clone(),
            temperature: config.temperature,
            max_candidates: config.max_candidates,
            fallback_count: config.fallback_count,
        }
    }

    /// Select candidates, degrading to [`Self::fallback`] on any error.
    pub async fn select(
        &self,
        candidates: &[LinkCandidate],
        purpose: &str,
        has_sections: bool,
    ) -> Vec<LinkCandidate> {
        match self.try_select(candidates, purpose, has_sections).await {
            Ok(selected) => selected,
            Err(e) => {
                warn!(
                    error = %e,
                    fallback = self.fallback_count,
                    "Link selection degraded to fallback"
                );
                self.fallback(candidates)
            }
        }
    }

    /// Ask the model to choose. Returns an empty selection when the answer
    /// names no valid candidate.
    pub async fn try_select(
        &self,
        candidates: &[LinkCandidate],
        purpose: &str,
        has_sections: bool,
    ) -> Result<Vec<LinkCandidate>, SelectorError> {
        if !self.llm.is_configured() {
            return Err(SelectorError::Unavailable);
        }
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let shown = &candidates[..candidates.len().min(self.max_candidates)];
        let prompt = self.build_prompt(shown, purpose, has_sections);

        let request = LlmRequest::new(LlmTask::SelectLinks, prompt)
            .with_model(&self.model)
            .with_temperature(self.temperature);
        let response = self.llm.generate(&request).await?;

        let indices = parse_indices(&response.text, shown.len());
        debug!(answer = %response.text.trim(), "Link selector answered");
        info!(
            offered = shown.len(),
            selected = indices.len(),
            "Links selected"
        );

        Ok(indices.into_iter().map(|i| shown[i].clone()).collect())
    }

    /// First `fallback_count` candidates in original order.
    pub fn fallback(&self, candidates: &[LinkCandidate]) -> Vec<LinkCandidate> {
        candidates.iter().take(self.fallback_count).cloned().collect()
    }

    fn build_prompt(&self, shown: &[LinkCandidate], purpose: &str, has_sections: bool) -> String {
        let candidates = shown
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let anchor = if c.anchor_text.is_empty() {
                    "(no text)"
                } else {
                    c.anchor_text.as_str()
                };
                if has_sections {
                    format!("{}. [{}] {} - {}", i + 1, c.section, anchor, c.url)
                } else {
                    format!("{}. {} - {}", i + 1, anchor, c.url)
                }
            })
            .collect::<Vec<_>>()
            .join("\n");

        SELECT_LINKS_PROMPT
            .replace("{purpose}", purpose)
            .replace("{section_rules}", if has_sections { SECTION_RULES } else { "" })
            .replace("{candidates}", &candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockLanguageModel;
    use crate::types::page::LinkSection;

    fn candidates(n: usize) -> Vec<LinkCandidate> {
        (1..=n)
            .map(|i| {
                LinkCandidate::new(
                    format!("https://acme.com/p{}", i),
                    format!("Page {}", i),
                    LinkSection::Main,
                )
            })
            .collect()
    }

    #[test]
    fn test_parse_indices() {
        assert_eq!(parse_indices("1, 3, 2", 3), vec![0, 2, 1]);
        assert_eq!(parse_indices("0, 4, 99, 2, 2", 3), vec![1]);
        assert!(parse_indices("none of them", 3).is_empty());
        assert!(parse_indices("7, 8", 3).is_empty());
    }

    #[tokio::test]
    async fn test_select_uses_model_indices() {
        let llm = Arc::new(MockLanguageModel::new().with_response(LlmTask::SelectLinks, "2,4"));
        let selector = FrontierSelector::new(llm.clone(), &CrawlConfig::default());

        let chosen = selector.select(&candidates(5), depth_purpose(1), true).await;
        let urls: Vec<_> = chosen.iter().map(|c| c.url.as_str()).collect();
        assert_eq!(urls, vec!["https://acme.com/p2", "https://acme.com/p4"]);

        let prompt = &llm.calls()[0].prompt;
        assert!(prompt.contains("[main] Page 1"));
        assert!(prompt.contains("never choose [footer]"));
    }

    #[tokio::test]
    async fn test_out_of_range_gives_empty_selection() {
        let llm = Arc::new(MockLanguageModel::new().with_response(LlmTask::SelectLinks, "0, 12"));
        let selector = FrontierSelector::new(llm, &CrawlConfig::default());
        assert!(selector.select(&candidates(3), "x", false).await.is_empty());
    }

    #[tokio::test]
    async fn test_unconfigured_falls_back_to_first_five() {
        let llm = Arc::new(MockLanguageModel::unconfigured());
        let selector = FrontierSelector::new(llm.clone(), &CrawlConfig::default());

        assert!(matches!(
            selector.try_select(&candidates(8), "x", true).await,
            Err(SelectorError::Unavailable)
        ));
        let chosen = selector.select(&candidates(8), "x", true).await;
        assert_eq!(chosen.len(), 5);
        assert_eq!(chosen[0].url, "https://acme.com/p1");
        assert!(llm.calls().is_empty());
    }

    #[tokio::test]
    async fn test_model_failure_falls_back() {
        let llm = Arc::new(MockLanguageModel::new().fail_task(LlmTask::SelectLinks));
        let selector = FrontierSelector::new(llm, &CrawlConfig::default());
        assert_eq!(selector.select(&candidates(3), "x", false).await.len(), 3);
    }

    #[tokio::test]
    async fn test_only_window_is_offered() {
        let llm = Arc::new(MockLanguageModel::new().with_response(LlmTask::SelectLinks, "151"));
        let selector = FrontierSelector::new(llm.clone(), &CrawlConfig::default());
        assert!(selector.select(&candidates(200), "x", false).await.is_empty());
        assert!(!llm.calls()[0].prompt.contains("p151"));
    }
}
