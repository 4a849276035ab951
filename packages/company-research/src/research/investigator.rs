//! Research investigator: one grounded search call per topic.

use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

use super::prompts::INVESTIGATE_PROMPT;
use crate::error::{LlmError, ResearchError, Result};
use crate::traits::llm::{LanguageModel, LlmRequest, LlmTask};
use crate::types::research::{CompanyProfile, GroundingChunk, ResearchResult, ResearchTopic, Source};

pub struct Investigator {
    llm: Arc<dyn LanguageModel>,
    model: String,
    temperature: f32,
}

impl Investigator {
    pub fn new(llm: Arc<dyn LanguageModel>, model: impl Into<String>, temperature: f32) -> Self {
        Self {
            llm,
            model: model.into(),
            temperature,
        }
    }

    /// Investigate one topic with a search-grounded model call.
    pub async fn investigate(
        &self,
        domain: &str,
        profile: &CompanyProfile,
        topic: &ResearchTopic,
    ) -> Result<ResearchResult> {
        let prompt = INVESTIGATE_PROMPT
            .replace("{company_name}", &profile.company_name)
            .replace("{domain}", domain)
            .replace("{topic}", &topic.topic)
            .replace("{reason}", &topic.reason);

        let request = LlmRequest::new(LlmTask::Investigate, prompt)
            .with_model(&self.model)
            .with_temperature(self.temperature)
            .grounded();

        debug!(topic = %topic.topic, priority = %topic.priority, "Investigating topic");
        let response = self.llm.generate(&request).await?;

        let findings = response.text.trim().to_string();
        if findings.is_empty() {
            return Err(ResearchError::Model(LlmError::InvalidResponse(
                "empty investigation answer".into(),
            )));
        }

        let sources = sources_from_chunks(&response.grounding_chunks);
        info!(topic = %topic.topic, sources = sources.len(), "Topic investigated");

        Ok(ResearchResult {
            topic: topic.topic.clone(),
            findings,
            sources,
            grounding_chunks: response.grounding_chunks,
        })
    }
}

/// One source per distinct cited URI, in citation order.
pub fn sources_from_chunks(chunks: &[GroundingChunk]) -> Vec<Source> {
    let mut seen = HashSet::new();
    chunks
        .iter()
        .filter_map(|chunk| chunk.web.as_ref())
        .filter(|web| seen.insert(web.uri.clone()))
        .map(|web| Source {
            title: web.title.clone().unwrap_or_else(|| web.uri.clone()),
            url: web.uri.clone(),
        })
        .collect()
}
