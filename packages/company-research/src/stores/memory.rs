//! In-memory cache store for testing and development.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::CacheResult;
use crate::traits::store::{cache_key, ArtifactKind, CacheStore, CachedArtifact};

/// In-memory artifact cache.
///
/// Applies the same TTL rules as the file store. Data is lost on restart.
#[derive(Default)]
pub struct MemoryCacheStore {
    entries: RwLock<HashMap<(String, ArtifactKind), CachedArtifact>>,
}

impl MemoryCacheStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an artifact with an explicit save time (for TTL tests).
    pub fn insert_at(
        &self,
        domain: &str,
        kind: ArtifactKind,
        data: serde_json::Value,
        saved_at: DateTime<Utc>,
    ) {
        let key = cache_key(domain);
        let artifact = CachedArtifact::new(key.clone(), kind, data).with_saved_at(saved_at);
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert((key, kind), artifact);
    }

    /// Whether any entry (fresh or stale) exists.
    pub fn contains(&self, domain: &str, kind: ArtifactKind) -> bool {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(&(cache_key(domain), kind))
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn load(
        &self,
        domain: &str,
        kind: ArtifactKind,
    ) -> CacheResult<Option<serde_json::Value>> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        Ok(entries
            .get(&(cache_key(domain), kind))
            .filter(|artifact| !artifact.is_stale(Utc::now()))
            .map(|artifact| artifact.data.clone()))
    }

    async fn save(
        &self,
        domain: &str,
        kind: ArtifactKind,
        artifact: &serde_json::Value,
    ) -> CacheResult<()> {
        self.insert_at(domain, kind, artifact.clone(), Utc::now());
        Ok(())
    }
}
