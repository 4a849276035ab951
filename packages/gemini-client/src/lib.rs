//! Pure Gemini REST API client
//!
//! A minimal client for the Gemini `generateContent` endpoint with no
//! domain-specific logic. Supports plain generation, structured (schema
//! constrained) output, and Google Search grounded generation.
//!
//! # Example
//!
//! ```rust,ignore
//! use gemini_client::{to_gemini_schema, GeminiClient, GenerateRequest};
//!
//! let client = GeminiClient::new(api_key);
//!
//! // Plain generation
//! let response = client
//!     .generate(GenerateRequest::new("gemini-2.5-flash", "Hello!").temperature(0.2))
//!     .await?;
//!
//! // Grounded search with citations
//! let grounded = client
//!     .generate(
//!         GenerateRequest::new("gemini-2.5-flash", "Acme Corp revenue 2024").with_google_search(),
//!     )
//!     .await?;
//! for chunk in grounded.grounding_chunks() {
//!     println!("{:?}", chunk.web);
//! }
//!
//! // Structured output
//! let schema = to_gemini_schema(serde_json::to_value(schemars::schema_for!(Verdict))?);
//! let verdict = client
//!     .generate(GenerateRequest::new("gemini-2.5-flash", prompt).response_schema(schema))
//!     .await?;
//! ```

pub mod error;
pub mod schema;
pub mod types;

pub use error::{GeminiError, Result};
pub use schema::to_gemini_schema;
pub use types::*;

use reqwest::Client;
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Pure Gemini API client.
#[derive(Clone)]
pub struct GeminiClient {
    http_client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    /// Create a new Gemini client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Set a custom base URL (for proxies, regional endpoints, etc.).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }

    /// Generate content.
    ///
    /// Returns the concatenated text of the first candidate together with any
    /// grounding metadata.
    pub async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse> {
        let start = std::time::Instant::now();

        let response = self
            .http_client
            .post(self.endpoint(&request.model))
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Gemini request failed");
                GeminiError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "Gemini API error");
            return Err(GeminiError::Api(format!(
                "Gemini API error ({}): {}",
                status, error_text
            )));
        }

        let raw: types::GenerateResponseRaw = response
            .json()
            .await
            .map_err(|e| GeminiError::Parse(e.to_string()))?;

        let usage = raw.usage_metadata;
        let candidate = raw.candidates.into_iter().next().ok_or_else(|| {
            let feedback = raw
                .prompt_feedback
                .map(|f| f.to_string())
                .unwrap_or_else(|| "no candidates".to_string());
            GeminiError::EmptyResponse(feedback)
        })?;

        let text = candidate
            .content
            .as_ref()
            .map(|c| c.text())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(GeminiError::EmptyResponse(
                candidate
                    .finish_reason
                    .unwrap_or_else(|| "empty text".to_string()),
            ));
        }

        debug!(
            model = %request.model,
            grounded = !request.tools.is_empty(),
            duration_ms = start.elapsed().as_millis(),
            "Gemini generateContent"
        );

        Ok(GenerateResponse {
            text,
            grounding: candidate.grounding_metadata,
            usage,
        })
    }
}
