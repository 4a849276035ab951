//! reqwest-backed fetcher.
//!
//! Page fetches follow redirects and identify the bot through its user
//! agent. Citation resolution uses a second client with redirects disabled
//! so the `Location` of a 3xx can be read directly.

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::redirect::Policy;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::error::{FetchError, FetchResult};
use crate::traits::fetcher::{FetchedDocument, Fetcher};
use crate::types::config::DEFAULT_USER_AGENT;

/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for citation redirect probes.
const RESOLVE_TIMEOUT: Duration = Duration::from_secs(10);

/// Largest page body read. Longer streamed bodies are cut off here.
const MAX_BODY_BYTES: usize = 5 * 1024 * 1024;

/// HTTP fetcher.
///
/// # Example
///
/// ```rust,ignore
/// use company_research::fetch::HttpFetcher;
///
/// let fetcher = HttpFetcher::new()?.with_user_agent("MyBot/1.0");
/// let doc = fetcher.fetch("https://example.com").await?;
/// ```
pub struct HttpFetcher {
    client: reqwest::Client,
    resolver: reqwest::Client,
    user_agent: String,
}

impl HttpFetcher {
    /// Create a fetcher with the default user agent.
    pub fn new() -> FetchResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .redirect(Policy::limited(10))
            .build()
            .map_err(|e| FetchError::Http(Box::new(e)))?;

        let resolver = reqwest::Client::builder()
            .timeout(RESOLVE_TIMEOUT)
            .redirect(Policy::none())
            .build()
            .map_err(|e| FetchError::Http(Box::new(e)))?;

        Ok(Self {
            client,
            resolver,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        })
    }

    /// Set a custom user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

fn is_html(content_type: &str) -> bool {
    let ct = content_type.to_lowercase();
    ct.is_empty() || ct.contains("text/html") || ct.contains("application/xhtml")
}

/// Append `chunk` without growing `body` past `cap`. Returns `true` once the
/// cap is reached.
fn push_capped(body: &mut Vec<u8>, chunk: &[u8], cap: usize) -> bool {
    let room = cap.saturating_sub(body.len());
    if chunk.len() >= room {
        body.extend_from_slice(&chunk[..room]);
        return true;
    }
    body.extend_from_slice(chunk);
    false
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<FetchedDocument> {
        let parsed = Url::parse(url).map_err(|_| FetchError::InvalidUrl {
            url: url.to_string(),
        })?;

        debug!(url = %url, "HTTP fetch starting");
        let mut response = self
            .client
            .get(parsed)
            .header("User-Agent", &self.user_agent)
            .send()
            .await
            .map_err(|e| {
                warn!(url = %url, error = %e, "HTTP request failed");
                FetchError::Http(Box::new(e))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !is_html(&content_type) {
            return Err(FetchError::NotHtml {
                url: url.to_string(),
                content_type,
            });
        }

        if let Some(bytes) = response.content_length() {
            if bytes > MAX_BODY_BYTES as u64 {
                return Err(FetchError::TooLarge {
                    url: url.to_string(),
                    bytes,
                });
            }
        }

        let mut raw = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| FetchError::Http(Box::new(e)))?
        {
            if push_capped(&mut raw, &chunk, MAX_BODY_BYTES) {
                debug!(url = %url, limit = MAX_BODY_BYTES, "Body truncated at size limit");
                break;
            }
        }
        let body = String::from_utf8_lossy(&raw).into_owned();

        debug!(
            url = %url,
            final_url = %final_url,
            bytes = body.len(),
            "HTTP fetch complete"
        );

        Ok(FetchedDocument {
            url: url.to_string(),
            final_url,
            status: status.as_u16(),
            body,
        })
    }

    async fn resolve_redirect(&self, url: &str) -> Option<String> {
        let parsed = Url::parse(url).ok()?;

        let response = match self
            .resolver
            .head(parsed.clone())
            .header("User-Agent", &self.user_agent)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                debug!(url = %url, error = %e, "Redirect probe failed");
                return None;
            }
        };

        let status = response.status();
        if status.is_redirection() {
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())?;
            parsed.join(location).ok().map(|u| u.to_string())
        } else if status == reqwest::StatusCode::OK {
            Some(url.to_string())
        } else {
            debug!(url = %url, status = %status, "Redirect probe left unresolved");
            None
        }
    }
}
