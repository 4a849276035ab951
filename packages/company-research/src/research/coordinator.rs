//! Research coordinator: turns the company profile into research topics.

use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use super::prompts::{PLAN_TOPICS_PROMPT, REPORT_OUTLINE};
use crate::error::Result;
use crate::traits::llm::{generate_structured, LanguageModel, LlmRequest, LlmTask};
use crate::types::research::{CompanyProfile, ResearchTopic};

/// Structured answer of the planning call.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct TopicPlan {
    /// Topics to research, most important first
    pub topics: Vec<ResearchTopic>,
}

pub struct Coordinator {
    llm: Arc<dyn LanguageModel>,
    model: String,
    temperature: f32,
}

impl Coordinator {
    pub fn new(llm: Arc<dyn LanguageModel>, model: impl Into<String>, temperature: f32) -> Self {
        Self {
            llm,
            model: model.into(),
            temperature,
        }
    }

    /// Plan the first round of topics.
    pub async fn plan(&self, domain: &str, profile: &CompanyProfile) -> Result<Vec<ResearchTopic>> {
        let prompt = PLAN_TOPICS_PROMPT
            .replace("{company_name}", &profile.company_name)
            .replace("{domain}", domain)
            .replace("{profile}", &describe_profile(profile))
            .replace("{outline}", REPORT_OUTLINE);

        let request = LlmRequest::new(LlmTask::PlanTopics, prompt)
            .with_model(&self.model)
            .with_temperature(self.temperature);
        let plan: TopicPlan = generate_structured(self.llm.as_ref(), request).await?;

        info!(domain = %domain, topics = plan.topics.len(), "Research topics planned");
        Ok(plan.topics)
    }
}

/// Render a profile as prompt text.
pub(crate) fn describe_profile(profile: &CompanyProfile) -> String {
    let mut out = format!("{}: {}", profile.company_name, profile.short_description);
    if !profile.overview.is_empty() {
        out.push_str("\n\n");
        out.push_str(&profile.overview);
    }
    if !profile.key_facts.is_empty() {
        out.push_str("\n\nKey facts:");
        for fact in &profile.key_facts {
            out.push_str("\n- ");
            out.push_str(fact);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockLanguageModel;
    use crate::types::research::Priority;

    #[tokio::test]
    async fn test_plan_parses_topics() {
        let llm = Arc::new(MockLanguageModel::new().with_response(
            LlmTask::PlanTopics,
            r#"{"topics": [{"topic": "Annual revenue", "priority": "high", "reason": "Not on site"}]}"#,
        ));
        let coordinator = Coordinator::new(llm.clone(), "m", 0.3);
        let profile = CompanyProfile::new("Acme", "Bridge builder").with_fact("Founded 1990");

        let topics = coordinator.plan("acme.com", &profile).await.unwrap();
        assert_eq!(
            topics,
            vec![ResearchTopic::new("Annual revenue", Priority::High, "Not on site")]
        );

        let call = &llm.calls()[0];
        assert!(call.prompt.contains("Founded 1990"));
        assert!(call.prompt.contains("Financials"));
        assert!(call.response_schema.is_some());
    }

    #[tokio::test]
    async fn test_plan_rejects_malformed_answer() {
        let llm = Arc::new(MockLanguageModel::new().with_response(LlmTask::PlanTopics, "sorry"));
        let coordinator = Coordinator::new(llm, "m", 0.3);
        assert!(coordinator
            .plan("acme.com", &CompanyProfile::new("Acme", "x"))
            .await
            .is_err());
    }
}
