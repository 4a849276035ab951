//! LLM-backed company profile summarizer.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::error::Result;
use crate::traits::llm::{generate_structured, LanguageModel, LlmRequest, LlmTask};
use crate::traits::summarizer::ProfileSummarizer;
use crate::types::page::CrawlResult;
use crate::types::research::CompanyProfile;

const SUMMARIZE_PROFILE_PROMPT: &str = r#"Below are pages crawled from the website {domain}. Summarize the company behind it.

Return:
- companyName: the company's name as it presents itself
- shortDescription: one or two sentences on what the company does
- overview: a paragraph covering business areas, products or services, markets and history
- keyFacts: concrete facts stated on the site (founding year, locations, certifications, clients, figures)

Use only what the pages say. Leave a field empty rather than guess.

Pages:
{pages}"#;

/// Per-page text budget in the prompt.
const PAGE_CHARS: usize = 2_000;

/// Total text budget across pages.
const TOTAL_CHARS: usize = 40_000;

pub struct LlmProfileSummarizer {
    llm: Arc<dyn LanguageModel>,
    model: String,
    temperature: f32,
}

impl LlmProfileSummarizer {
    pub fn new(llm: Arc<dyn LanguageModel>, model: impl Into<String>) -> Self {
        Self {
            llm,
            model: model.into(),
            temperature: 0.2,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Shallow pages first, each page cut to its budget, until the total runs out.
fn digest(crawl: &CrawlResult) -> String {
    let mut pages: Vec<_> = crawl.pages.iter().collect();
    pages.sort_by_key(|p| p.depth);

    let mut out = String::new();
    for page in pages {
        if out.len() >= TOTAL_CHARS {
            break;
        }
        let text: String = page.text_content.chars().take(PAGE_CHARS).collect();
        out.push_str(&format!("## {} ({})\n{}\n\n", page.title, page.url, text));
    }
    out
}

#[async_trait]
impl ProfileSummarizer for LlmProfileSummarizer {
    async fn summarize(&self, domain: &str, crawl: &CrawlResult) -> Result<CompanyProfile> {
        let prompt = SUMMARIZE_PROFILE_PROMPT
            .replace("{domain}", domain)
            .replace("{pages}", &digest(crawl));

        let request = LlmRequest::new(LlmTask::SummarizeProfile, prompt)
            .with_model(&self.model)
            .with_temperature(self.temperature);
        let profile: CompanyProfile = generate_structured(self.llm.as_ref(), request).await?;

        info!(
            domain = %domain,
            company = %profile.company_name,
            facts = profile.key_facts.len(),
            "Profile summarized"
        );
        Ok(profile)
    }
}
