//! Language-model trait.
//!
//! One request/response capability serves every AI-backed stage: link
//! selection, topic planning, grounded investigation, identity validation,
//! completeness checks and profile summarization. Requests carry a
//! [`LlmTask`] tag so implementations and mocks can tell the stages apart.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;

use crate::error::{LlmResult, Result};
use crate::types::research::GroundingChunk;

/// Which pipeline stage issued a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LlmTask {
    SelectLinks,
    PlanTopics,
    Investigate,
    ValidateFinding,
    CheckCompleteness,
    SummarizeProfile,
}

impl LlmTask {
    /// Snake-case label for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SelectLinks => "select_links",
            Self::PlanTopics => "plan_topics",
            Self::Investigate => "investigate",
            Self::ValidateFinding => "validate_finding",
            Self::CheckCompleteness => "check_completeness",
            Self::SummarizeProfile => "summarize_profile",
        }
    }
}

/// A single model call.
#[derive(Debug, Clone)]
pub struct LlmRequest {
    pub task: LlmTask,

    pub prompt: String,

    /// Model override; implementations fall back to their default
    pub model: Option<String>,

    pub temperature: f32,

    /// JSON Schema (as produced by `schemars`) the answer must follow
    pub response_schema: Option<serde_json::Value>,

    /// Ask for a search-grounded answer with citation metadata
    pub grounded: bool,
}

impl LlmRequest {
    /// Create a free-text request.
    pub fn new(task: LlmTask, prompt: impl Into<String>) -> Self {
        Self {
            task,
            prompt: prompt.into(),
            model: None,
            temperature: 0.2,
            response_schema: None,
            grounded: false,
        }
    }

    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Constrain the answer to the JSON schema of `T`.
    pub fn structured<T: JsonSchema>(mut self) -> Self {
        let schema = schemars::schema_for!(T);
        self.response_schema = serde_json::to_value(schema).ok();
        self
    }

    /// Request a grounded (citation-bearing) answer.
    pub fn grounded(mut self) -> Self {
        self.grounded = true;
        self
    }
}

/// Model answer.
#[derive(Debug, Clone, Default)]
pub struct LlmResponse {
    pub text: String,

    /// Citations; empty unless the request was grounded
    pub grounding_chunks: Vec<GroundingChunk>,
}

impl LlmResponse {
    /// Create a text-only response.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            grounding_chunks: Vec::new(),
        }
    }

    /// Attach grounding chunks.
    pub fn with_grounding(mut self, chunks: Vec<GroundingChunk>) -> Self {
        self.grounding_chunks = chunks;
        self
    }
}

/// Language-model service.
///
/// Implementations wrap a specific provider (Gemini, etc.) and report a
/// missing credential as [`crate::error::LlmError::MissingCredential`] rather
/// than as a generic failure.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Whether a credential is configured. Stages that can degrade check
    /// this before calling.
    fn is_configured(&self) -> bool {
        true
    }

    /// Run one request.
    async fn generate(&self, request: &LlmRequest) -> LlmResult<LlmResponse>;
}

/// Run a structured request and deserialize the answer into `T`.
pub async fn generate_structured<T>(llm: &dyn LanguageModel, request: LlmRequest) -> Result<T>
where
    T: DeserializeOwned + JsonSchema,
{
    let request = request.structured::<T>();
    let response = llm.generate(&request).await?;
    Ok(parse_json_response(&response.text)?)
}

/// Parse JSON that may be wrapped in a markdown code block.
pub fn parse_json_response<T: DeserializeOwned>(text: &str) -> serde_json::Result<T> {
    serde_json::from_str(text).or_else(|_| {
        let json_str = text
            .trim()
            .trim_start_matches("```json")
            .trim_start_matches("```")
            .trim_end_matches("```")
            .trim();
        serde_json::from_str(json_str)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, JsonSchema)]
    struct Verdict {
        complete: bool,
    }

    #[test]
    fn test_parse_plain_json() {
        let v: Verdict = parse_json_response(r#"{"complete": true}"#).unwrap();
        assert!(v.complete);
    }

    #[test]
    fn test_parse_fenced_json() {
        let v: Verdict = parse_json_response("```json\n{\"complete\": false}\n```").unwrap();
        assert!(!v.complete);
    }

    #[test]
    fn test_structured_sets_schema() {
        let request = LlmRequest::new(LlmTask::CheckCompleteness, "p").structured::<Verdict>();
        let schema = request.response_schema.unwrap();
        assert!(schema["properties"]["complete"].is_object());
        assert!(!request.grounded);
    }
}
