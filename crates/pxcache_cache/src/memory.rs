use dashmap::DashMap;
use tracing::debug;

use crate::{CacheError, CacheKey, CacheStore};

/// In-process store. Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: DashMap<String, String>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CacheStore for MemoryCacheStore {
    async fn exists(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key.as_str())
    }

    async fn read(&self, key: &CacheKey) -> Result<String, CacheError> {
        let body = self
            .entries
            .get(key.as_str())
            .map(|entry| entry.value().clone())
            .ok_or_else(|| CacheError::NotFound(key.clone()))?;
        debug!(target: "pxcache::cache", cache_key = %key, layer = "memory", "Cache hit");
        Ok(body)
    }

    async fn write(&self, key: &CacheKey, body: &str) -> Result<(), CacheError> {
        self.entries.insert(key.as_str().to_string(), body.to_string());
        debug!(
            target: "pxcache::cache",
            cache_key = %key,
            layer = "memory",
            bytes = body.len(),
            "Cache entry stored"
        );
        Ok(())
    }
}
