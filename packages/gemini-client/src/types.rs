//! Gemini API request and response types.

use serde::{Deserialize, Serialize};

// =============================================================================
// generateContent request
// =============================================================================

/// A `generateContent` request.
///
/// The model is part of the endpoint path, not the body, so it is kept
/// out of serialization.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    /// Model to use (e.g., "gemini-2.5-flash")
    #[serde(skip)]
    pub model: String,

    /// Conversation turns
    pub contents: Vec<Content>,

    /// Sampling and output settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,

    /// Tools (only Google Search grounding is used here)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,
}

impl GenerateRequest {
    /// Create a request for `model` with a single user prompt.
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            contents: vec![Content::user(prompt)],
            generation_config: None,
            tools: Vec::new(),
        }
    }

    /// Set temperature.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config_mut().temperature = Some(temperature);
        self
    }

    /// Request JSON output constrained by `schema`.
    ///
    /// The schema must already be in Gemini's OpenAPI subset; see
    /// [`crate::schema::to_gemini_schema`].
    pub fn response_schema(mut self, schema: serde_json::Value) -> Self {
        let config = self.config_mut();
        config.response_mime_type = Some("application/json".to_string());
        config.response_schema = Some(schema);
        self
    }

    /// Enable Google Search grounding.
    pub fn with_google_search(mut self) -> Self {
        self.tools.push(Tool::google_search());
        self
    }

    fn config_mut(&mut self) -> &mut GenerationConfig {
        self.generation_config
            .get_or_insert_with(GenerationConfig::default)
    }
}

/// One conversation turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    /// "user" or "model"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Content parts
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    /// Create a user turn.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![Part::text(text)],
        }
    }

    /// Concatenate all text parts.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect::<Vec<_>>()
            .join("")
    }
}

/// A content part. Only text parts are produced or consumed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Part {
    /// Create a text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }
}

/// Generation settings.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<serde_json::Value>,
}

/// Tool declaration.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_search: Option<GoogleSearch>,
}

impl Tool {
    /// The Google Search grounding tool.
    pub fn google_search() -> Self {
        Self {
            google_search: Some(GoogleSearch {}),
        }
    }
}

/// Empty marker object for the `googleSearch` tool.
#[derive(Debug, Clone, Serialize)]
pub struct GoogleSearch {}

// =============================================================================
// generateContent response
// =============================================================================

/// Parsed `generateContent` response.
#[derive(Debug, Clone)]
pub struct GenerateResponse {
    /// Text of the first candidate
    pub text: String,

    /// Grounding metadata when search grounding was enabled
    pub grounding: Option<GroundingMetadata>,

    /// Token usage statistics
    pub usage: Option<UsageMetadata>,
}

impl GenerateResponse {
    /// Grounding chunks, empty when the response was not grounded.
    pub fn grounding_chunks(&self) -> &[GroundingChunk] {
        self.grounding
            .as_ref()
            .map(|g| g.grounding_chunks.as_slice())
            .unwrap_or(&[])
    }
}

/// Raw response from the API (for internal parsing).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateResponseRaw {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub usage_metadata: Option<UsageMetadata>,
    pub prompt_feedback: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Candidate {
    pub content: Option<Content>,
    pub finish_reason: Option<String>,
    pub grounding_metadata: Option<GroundingMetadata>,
}

/// Citation metadata attached to grounded responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingMetadata {
    /// Retrieved sources
    #[serde(default)]
    pub grounding_chunks: Vec<GroundingChunk>,

    /// Queries the model issued
    #[serde(default)]
    pub web_search_queries: Vec<String>,
}

/// A single retrieved source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroundingChunk {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web: Option<WebChunk>,
}

/// Web source of a grounding chunk.
///
/// `uri` is usually a redirect URL owned by the search provider and must be
/// resolved to find the real page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebChunk {
    pub uri: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Token usage statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,

    #[serde(default)]
    pub candidates_token_count: u32,

    #[serde(default)]
    pub total_token_count: u32,
}
