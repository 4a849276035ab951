//! Cache store trait for pipeline artifacts.
//!
//! Artifacts are keyed by `(domain, kind)` and stored as JSON inside a
//! [`CachedArtifact`] envelope that records when they were written. Stores
//! apply the per-kind TTL on load, so a stale entry reads as a miss.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

use crate::error::CacheResult;

/// Kind of artifact being cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    /// Crawl result
    Crawl,
    /// Company profile summarized from a crawl
    Profile,
    /// Agentic research bundle
    Research,
    /// Rendered report (written by the downstream report stage)
    Report,
}

impl ArtifactKind {
    /// Time-to-live, `None` meaning the artifact never expires.
    pub fn ttl(&self) -> Option<Duration> {
        match self {
            Self::Crawl | Self::Profile => Some(Duration::hours(24)),
            Self::Research | Self::Report => None,
        }
    }

    /// File-name friendly label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Crawl => "crawl",
            Self::Profile => "profile",
            Self::Research => "research",
            Self::Report => "report",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Envelope stored for every artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedArtifact {
    pub domain: String,
    pub kind: ArtifactKind,
    pub saved_at: DateTime<Utc>,
    pub data: serde_json::Value,
}

impl CachedArtifact {
    /// Wrap an artifact saved now.
    pub fn new(domain: impl Into<String>, kind: ArtifactKind, data: serde_json::Value) -> Self {
        Self {
            domain: domain.into(),
            kind,
            saved_at: Utc::now(),
            data,
        }
    }

    /// Set the saved timestamp.
    pub fn with_saved_at(mut self, saved_at: DateTime<Utc>) -> Self {
        self.saved_at = saved_at;
        self
    }

    /// Whether the artifact is older than its kind's TTL.
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        match self.kind.ttl() {
            Some(ttl) => now - self.saved_at > ttl,
            None => false,
        }
    }
}

/// Keyed, TTL-aware persistence of pipeline artifacts.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Load a fresh artifact, or `None` on a miss or a stale entry.
    async fn load(&self, domain: &str, kind: ArtifactKind)
        -> CacheResult<Option<serde_json::Value>>;

    /// Store an artifact, replacing any previous one.
    async fn save(&self, domain: &str, kind: ArtifactKind, artifact: &serde_json::Value)
        -> CacheResult<()>;
}

/// Canonical cache key for a domain: lower-cased, without scheme or
/// trailing slash.
pub fn cache_key(domain: &str) -> String {
    let lower = domain.trim().to_lowercase();
    lower
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/')
        .to_string()
}

/// Load and deserialize an artifact. Failures are logged and read as a miss.
pub async fn load_artifact<T: DeserializeOwned>(
    store: &dyn CacheStore,
    domain: &str,
    kind: ArtifactKind,
) -> Option<T> {
    match store.load(domain, kind).await {
        Ok(Some(value)) => match serde_json::from_value(value) {
            Ok(artifact) => {
                debug!(domain = %domain, kind = %kind, "Cache hit");
                Some(artifact)
            }
            Err(e) => {
                warn!(
                    domain = %domain,
                    kind = %kind,
                    error = %e,
                    "Cached artifact has unexpected shape"
                );
                None
            }
        },
        Ok(None) => {
            debug!(domain = %domain, kind = %kind, "Cache miss");
            None
        }
        Err(e) => {
            warn!(domain = %domain, kind = %kind, error = %e, "Cache read failed");
            None
        }
    }
}

/// Serialize and store an artifact. Failures are logged, never returned.
pub async fn save_artifact<T: Serialize>(
    store: &dyn CacheStore,
    domain: &str,
    kind: ArtifactKind,
    artifact: &T,
) {
    let value = match serde_json::to_value(artifact) {
        Ok(value) => value,
        Err(e) => {
            warn!(domain = %domain, kind = %kind, error = %e, "Failed to serialize artifact");
            return;
        }
    };

    if let Err(e) = store.save(domain, kind, &value).await {
        warn!(domain = %domain, kind = %kind, error = %e, "Cache write failed");
    }
}
