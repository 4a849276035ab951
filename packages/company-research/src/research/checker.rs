//! Completeness checker: decides whether another research round is needed.

use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use super::prompts::COMPLETENESS_PROMPT;
use crate::error::Result;
use crate::traits::llm::{generate_structured, LanguageModel, LlmRequest, LlmTask};
use crate::types::research::{CompanyProfile, ResearchTopic, ValidatedFinding};

/// Structured answer of the completeness call.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompletenessVerdict {
    /// Enough information for the final report
    pub is_complete: bool,

    #[serde(default)]
    pub reasoning: String,

    /// Topics for the next round when incomplete
    #[serde(default)]
    pub next_topics: Vec<ResearchTopic>,
}

pub struct CompletenessChecker {
    llm: Arc<dyn LanguageModel>,
    model: String,
    temperature: f32,
    preview_chars: usize,
}

impl CompletenessChecker {
    pub fn new(
        llm: Arc<dyn LanguageModel>,
        model: impl Into<String>,
        temperature: f32,
        preview_chars: usize,
    ) -> Self {
        Self {
            llm,
            model: model.into(),
            temperature,
            preview_chars,
        }
    }

    pub async fn check(
        &self,
        domain: &str,
        profile: &CompanyProfile,
        findings: &[ValidatedFinding],
    ) -> Result<CompletenessVerdict> {
        let prompt = COMPLETENESS_PROMPT
            .replace("{domain}", domain)
            .replace("{short_description}", &profile.short_description)
            .replace("{findings}", &self.preview(findings));

        let request = LlmRequest::new(LlmTask::CheckCompleteness, prompt)
            .with_model(&self.model)
            .with_temperature(self.temperature);
        let verdict: CompletenessVerdict = generate_structured(self.llm.as_ref(), request).await?;

        info!(
            domain = %domain,
            complete = verdict.is_complete,
            next_topics = verdict.next_topics.len(),
            reasoning = %verdict.reasoning,
            "Completeness checked"
        );
        Ok(verdict)
    }

    fn preview(&self, findings: &[ValidatedFinding]) -> String {
        if findings.is_empty() {
            return "(no validated findings yet)".to_string();
        }

        findings
            .iter()
            .enumerate()
            .map(|(i, f)| {
                let mut text: String = f
                    .validated_financials
                    .chars()
                    .take(self.preview_chars)
                    .collect();
                if f.validated_financials.chars().count() > self.preview_chars {
                    text.push_str("...");
                }
                format!("{}. [{}] (confidence: {}) {}", i + 1, f.topic, f.confidence_level, text)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockLanguageModel;
    use crate::types::research::Confidence;

    fn finding(text: &str) -> ValidatedFinding {
        ValidatedFinding {
            topic: "Revenue".into(),
            validated_financials: text.into(),
            confidence_level: Confidence::High,
            validated_urls: vec![],
            url_analysis: vec![],
        }
    }

    #[tokio::test]
    async fn test_previews_are_truncated() {
        let llm = Arc::new(MockLanguageModel::new().with_response(
            LlmTask::CheckCompleteness,
            r#"{"isComplete": false, "reasoning": "no headcount", "nextTopics": [{"topic": "Headcount", "priority": "medium", "reason": "size"}]}"#,
        ));
        let checker = CompletenessChecker::new(llm.clone(), "m", 0.1, 10);

        let verdict = checker
            .check("acme.com", &CompanyProfile::new("Acme", "Bridges"), &[finding(&"x".repeat(50))])
            .await
            .unwrap();

        assert!(!verdict.is_complete);
        assert_eq!(verdict.next_topics[0].topic, "Headcount");

        let prompt = &llm.calls()[0].prompt;
        assert!(prompt.contains(&format!("{}...", "x".repeat(10))));
        assert!(!prompt.contains(&"x".repeat(11)));
        assert!(prompt.contains("confidence: high"));
    }
}
