//! Fetcher trait for page retrieval and citation redirect resolution.

use async_trait::async_trait;

use crate::error::FetchResult;

/// A fetched HTML document.
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    /// URL that was requested
    pub url: String,

    /// URL after following redirects
    pub final_url: String,

    /// HTTP status code
    pub status: u16,

    /// Response body
    pub body: String,
}

impl FetchedDocument {
    /// Create a document served without redirects.
    pub fn new(url: impl Into<String>, body: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            final_url: url.clone(),
            url,
            status: 200,
            body: body.into(),
        }
    }

    /// Set the post-redirect URL.
    pub fn with_final_url(mut self, final_url: impl Into<String>) -> Self {
        self.final_url = final_url.into();
        self
    }
}

/// HTTP fetch capability.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// GET a page, following redirects. Non-success statuses and non-HTML
    /// bodies are errors.
    async fn fetch(&self, url: &str) -> FetchResult<FetchedDocument>;

    /// Resolve where a citation URL points without following redirects.
    ///
    /// Returns the `Location` target on a 3xx, the URL itself on 200, and
    /// `None` otherwise.
    async fn resolve_redirect(&self, url: &str) -> Option<String>;
}
