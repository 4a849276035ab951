//! Typed errors for the research library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.

use thiserror::Error;

/// Errors from the HTTP fetcher.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Invalid URL format
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    /// Transport-level failure (DNS, TLS, connection reset, timeout)
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Server answered with a non-success status
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    /// Response is not an HTML document
    #[error("not an HTML document ({content_type}): {url}")]
    NotHtml { url: String, content_type: String },

    /// Declared body size exceeds the fetch limit
    #[error("response too large ({bytes} bytes): {url}")]
    TooLarge { url: String, bytes: u64 },
}

/// Errors from a language-model call.
#[derive(Debug, Error)]
pub enum LlmError {
    /// No API credential configured. Distinct from a failed call: callers
    /// either degrade (link selection) or abort (research).
    #[error("language model credential not configured")]
    MissingCredential,

    /// The request failed (network, quota, API error)
    #[error("language model request failed: {0}")]
    Request(String),

    /// The model answered but the answer was unusable
    #[error("invalid language model response: {0}")]
    InvalidResponse(String),
}

/// Errors from a cache store.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Filesystem failure
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored artifact could not be (de)serialized
    #[error("cache serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors from the AI frontier selector.
///
/// Every variant degrades to the fallback selection at the call site.
#[derive(Debug, Error)]
pub enum SelectorError {
    /// No model credential configured
    #[error("link selector unavailable: no model credential")]
    Unavailable,

    /// The model call failed
    #[error("link selection failed: {0}")]
    Model(#[from] LlmError),
}

/// Errors from the research loop and its stages.
#[derive(Debug, Error)]
pub enum ResearchError {
    /// No model credential configured
    #[error("research unavailable: no model credential")]
    MissingCredential,

    /// Model call failed
    #[error("model error: {0}")]
    Model(LlmError),

    /// Model answer did not match the expected shape
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Operation was cancelled
    #[error("operation cancelled")]
    Cancelled,
}

impl ResearchError {
    /// Whether this error must abort the whole research call rather than
    /// just the current topic or finding.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::MissingCredential | Self::Cancelled)
    }
}

impl From<LlmError> for ResearchError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::MissingCredential => Self::MissingCredential,
            other => Self::Model(other),
        }
    }
}

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for model calls.
pub type LlmResult<T> = std::result::Result<T, LlmError>;

/// Result type alias for cache operations.
pub type CacheResult<T> = std::result::Result<T, CacheError>;

/// Result type alias for research operations.
pub type Result<T> = std::result::Result<T, ResearchError>;
