//! Testing utilities including mock implementations.
//!
//! These let applications and tests drive the crawl engine and research
//! loop without real model calls or network access.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::error::{FetchError, FetchResult, LlmError, LlmResult};
use crate::parse::normalize_url;
use crate::traits::fetcher::{FetchedDocument, Fetcher};
use crate::traits::llm::{LanguageModel, LlmRequest, LlmResponse, LlmTask};

/// A mock language model for testing.
///
/// Responses are scripted per [`LlmTask`]: queued responses are returned in
/// order, then the task's default (if any). A task with nothing scripted
/// fails with [`LlmError::Request`].
pub struct MockLanguageModel {
    /// Queued responses by task
    responses: Arc<RwLock<HashMap<LlmTask, VecDeque<LlmResponse>>>>,

    /// Responses returned once a task's queue is empty
    defaults: Arc<RwLock<HashMap<LlmTask, LlmResponse>>>,

    /// Tasks that always fail
    failing: Arc<RwLock<HashSet<LlmTask>>>,

    configured: bool,

    /// Call tracking for assertions
    calls: Arc<RwLock<Vec<LlmRequest>>>,
}

impl Default for MockLanguageModel {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLanguageModel {
    /// Create a configured mock with nothing scripted.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(RwLock::new(HashMap::new())),
            defaults: Arc::new(RwLock::new(HashMap::new())),
            failing: Arc::new(RwLock::new(HashSet::new())),
            configured: true,
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Create a mock that behaves like a model with no credential.
    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::new()
        }
    }

    /// Queue a text response for a task.
    pub fn with_response(self, task: LlmTask, text: impl Into<String>) -> Self {
        self.with_llm_response(task, LlmResponse::text(text))
    }

    /// Queue a full response (e.g. with grounding chunks) for a task.
    pub fn with_llm_response(self, task: LlmTask, response: LlmResponse) -> Self {
        self.responses
            .write()
            .unwrap()
            .entry(task)
            .or_default()
            .push_back(response);
        self
    }

    /// Set the response used once the task's queue is exhausted.
    pub fn with_default(self, task: LlmTask, response: LlmResponse) -> Self {
        self.defaults.write().unwrap().insert(task, response);
        self
    }

    /// Make every call for a task fail.
    pub fn fail_task(self, task: LlmTask) -> Self {
        self.failing.write().unwrap().insert(task);
        self
    }

    /// Get all calls made to this mock.
    pub fn calls(&self) -> Vec<LlmRequest> {
        self.calls.read().unwrap().clone()
    }

    /// Calls made for one task.
    pub fn calls_for(&self, task: LlmTask) -> Vec<LlmRequest> {
        self.calls
            .read()
            .unwrap()
            .iter()
            .filter(|c| c.task == task)
            .cloned()
            .collect()
    }

    /// Number of calls made for one task.
    pub fn call_count(&self, task: LlmTask) -> usize {
        self.calls_for(task).len()
    }
}

#[async_trait]
impl LanguageModel for MockLanguageModel {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn generate(&self, request: &LlmRequest) -> LlmResult<LlmResponse> {
        self.calls.write().unwrap().push(request.clone());

        if !self.configured {
            return Err(LlmError::MissingCredential);
        }
        if self.failing.read().unwrap().contains(&request.task) {
            return Err(LlmError::Request(format!(
                "mock failure for {}",
                request.task.as_str()
            )));
        }

        let queued = self
            .responses
            .write()
            .unwrap()
            .get_mut(&request.task)
            .and_then(|queue| queue.pop_front());

        queued
            .or_else(|| self.defaults.read().unwrap().get(&request.task).cloned())
            .ok_or_else(|| {
                LlmError::Request(format!(
                    "no scripted response for {}",
                    request.task.as_str()
                ))
            })
    }
}

/// A scripted page served by [`MockFetcher`].
#[derive(Debug, Clone)]
struct MockPage {
    final_url: Option<String>,
    body: String,
}

/// A mock fetcher for testing.
///
/// Pages are looked up by normalized URL. Unknown URLs answer 404.
#[derive(Default)]
pub struct MockFetcher {
    pages: Arc<RwLock<HashMap<String, MockPage>>>,

    /// Forced status codes by normalized URL
    statuses: Arc<RwLock<HashMap<String, u16>>>,

    /// Citation redirect targets by exact URL
    redirects: Arc<RwLock<HashMap<String, String>>>,

    /// Artificial latency per fetch
    delay: Option<Duration>,

    /// Fetches currently running, and the most seen at once
    in_flight: Arc<AtomicUsize>,
    peak_in_flight: Arc<AtomicUsize>,

    /// Call tracking
    fetches: Arc<RwLock<Vec<String>>>,
    resolves: Arc<RwLock<Vec<String>>>,
}

impl MockFetcher {
    /// Create a new mock fetcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `html` at `url`.
    pub fn with_page(self, url: &str, html: impl Into<String>) -> Self {
        self.pages.write().unwrap().insert(
            normalize_url(url),
            MockPage {
                final_url: None,
                body: html.into(),
            },
        );
        self
    }

    /// Serve `html` at `url`, reporting `final_url` as the post-redirect URL.
    pub fn with_redirected_page(self, url: &str, final_url: &str, html: impl Into<String>) -> Self {
        self.pages.write().unwrap().insert(
            normalize_url(url),
            MockPage {
                final_url: Some(final_url.to_string()),
                body: html.into(),
            },
        );
        self
    }

    /// Serve several pages under one site root.
    pub fn with_site(mut self, site_url: &str, pages: &[(&str, &str)]) -> Self {
        let root = site_url.trim_end_matches('/');
        for (path, html) in pages {
            self = self.with_page(&format!("{}{}", root, path), *html);
        }
        self
    }

    /// Answer `url` with an error status.
    pub fn with_status(self, url: &str, status: u16) -> Self {
        self.statuses.write().unwrap().insert(normalize_url(url), status);
        self
    }

    /// Resolve citation `url` to `target`.
    pub fn with_redirect(self, url: impl Into<String>, target: impl Into<String>) -> Self {
        self.redirects.write().unwrap().insert(url.into(), target.into());
        self
    }

    /// Sleep this long in every fetch.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// URLs passed to `fetch`, in call order.
    pub fn fetches(&self) -> Vec<String> {
        self.fetches.read().unwrap().clone()
    }

    /// Highest number of fetches that were running at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// URLs passed to `resolve_redirect`.
    pub fn resolve_calls(&self) -> Vec<String> {
        self.resolves.read().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<FetchedDocument> {
        self.fetches.write().unwrap().push(url.to_string());

        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(running, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let outcome = self.serve(url);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        outcome
    }

    async fn resolve_redirect(&self, url: &str) -> Option<String> {
        self.resolves.write().unwrap().push(url.to_string());
        self.redirects.read().unwrap().get(url).cloned()
    }
}

impl MockFetcher {
    fn serve(&self, url: &str) -> FetchResult<FetchedDocument> {
        let key = normalize_url(url);
        if let Some(status) = self.statuses.read().unwrap().get(&key).copied() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let page = self.pages.read().unwrap().get(&key).cloned();
        match page {
            Some(page) => {
                let doc = FetchedDocument::new(url, page.body);
                Ok(match page.final_url {
                    Some(final_url) => doc.with_final_url(final_url),
                    None => doc,
                })
            }
            None => Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}
