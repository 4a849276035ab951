//! Gemini implementation of [`LanguageModel`].
//!
//! Maps [`LlmRequest`] onto a `generateContent` call: response schemas are
//! converted to Gemini's OpenAPI subset and grounded requests enable the
//! Google Search tool, whose citations come back as grounding chunks.

use async_trait::async_trait;
use gemini_client::{to_gemini_schema, GeminiClient, GeminiError, GenerateRequest};
use std::time::Instant;
use tracing::debug;

use crate::error::{LlmError, LlmResult};
use crate::security::LlmCredentials;
use crate::traits::llm::{LanguageModel, LlmRequest, LlmResponse};
use crate::types::research::{GroundingChunk, WebSource};

/// Gemini-backed language model.
///
/// Built from [`LlmCredentials`]; without an API key every call fails with
/// [`LlmError::MissingCredential`].
pub struct GeminiModel {
    client: Option<GeminiClient>,
    default_model: String,
}

impl GeminiModel {
    pub fn new(credentials: &LlmCredentials) -> Self {
        let client = credentials.api_key.as_ref().map(|key| {
            let client = GeminiClient::new(key.expose());
            match &credentials.base_url {
                Some(url) => client.with_base_url(url),
                None => client,
            }
        });

        Self {
            client,
            default_model: credentials.model.clone(),
        }
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }
}

fn map_error(e: GeminiError) -> LlmError {
    match e {
        GeminiError::Network(msg) | GeminiError::Api(msg) => LlmError::Request(msg),
        GeminiError::EmptyResponse(msg) | GeminiError::Parse(msg) => {
            LlmError::InvalidResponse(msg)
        }
    }
}

#[async_trait]
impl LanguageModel for GeminiModel {
    fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    async fn generate(&self, request: &LlmRequest) -> LlmResult<LlmResponse> {
        let client = self.client.as_ref().ok_or(LlmError::MissingCredential)?;
        let model = request.model.as_deref().unwrap_or(&self.default_model);

        let mut call =
            GenerateRequest::new(model, request.prompt.as_str()).temperature(request.temperature);
        if let Some(schema) = &request.response_schema {
            call = call.response_schema(to_gemini_schema(schema.clone()));
        }
        if request.grounded {
            call = call.with_google_search();
        }

        let start = Instant::now();
        let response = client.generate(call).await.map_err(map_error)?;

        let grounding_chunks: Vec<GroundingChunk> = response
            .grounding_chunks()
            .iter()
            .map(|chunk| GroundingChunk {
                web: chunk
                    .web
                    .as_ref()
                    .map(|web| WebSource {
                        uri: web.uri.clone(),
                        title: web.title.clone(),
                    }),
            })
            .collect();

        debug!(
            task = request.task.as_str(),
            model = %model,
            grounding_chunks = grounding_chunks.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Model call complete"
        );

        Ok(LlmResponse::text(response.text).with_grounding(grounding_chunks))
    }
}
