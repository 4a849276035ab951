//! File-backed cache store.
//!
//! Layout: `<root>/<domain>/<kind>.json`, each file holding a
//! [`CachedArtifact`] envelope. The root directory is injected; nothing here
//! resolves platform paths.

use async_trait::async_trait;
use chrono::Utc;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::CacheResult;
use crate::traits::store::{cache_key, ArtifactKind, CacheStore, CachedArtifact};

/// JSON-file artifact cache.
#[derive(Debug, Clone)]
pub struct FileCacheStore {
    root: PathBuf,
}

impl FileCacheStore {
    /// Create a store rooted at `root`. The directory is created on first save.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file holding `(domain, kind)`.
    pub fn artifact_path(&self, domain: &str, kind: ArtifactKind) -> PathBuf {
        self.root
            .join(sanitize(&cache_key(domain)))
            .join(format!("{}.json", kind.as_str()))
    }
}

/// Keep a domain usable as a single path component.
fn sanitize(key: &str) -> String {
    let cleaned: String = key
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches('.').to_string();
    if cleaned.is_empty() {
        "_".to_string()
    } else {
        cleaned
    }
}

#[async_trait]
impl CacheStore for FileCacheStore {
    async fn load(
        &self,
        domain: &str,
        kind: ArtifactKind,
    ) -> CacheResult<Option<serde_json::Value>> {
        let path = self.artifact_path(domain, kind);
        let raw = match tokio::fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let artifact: CachedArtifact = serde_json::from_slice(&raw)?;
        if artifact.kind != kind || artifact.is_stale(Utc::now()) {
            debug!(path = %path.display(), "Cached artifact expired");
            return Ok(None);
        }
        Ok(Some(artifact.data))
    }

    async fn save(
        &self,
        domain: &str,
        kind: ArtifactKind,
        artifact: &serde_json::Value,
    ) -> CacheResult<()> {
        let path = self.artifact_path(domain, kind);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let envelope = CachedArtifact::new(cache_key(domain), kind, artifact.clone());
        let bytes = serde_json::to_vec_pretty(&envelope)?;

        // Write then rename so readers never see a half-written file.
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;

        debug!(path = %path.display(), "Cached artifact written");
        Ok(())
    }
}
