use std::future::Future;

use thiserror::Error;

use crate::CacheKey;

#[derive(Debug, Error)]
pub enum CacheError {
    /// No entry stored under this key. Callers treat it as a miss.
    #[error("no cache entry for '{0}'")]
    NotFound(CacheKey),

    #[error("cache I/O failure for '{key}': {source}")]
    Io {
        key: CacheKey,
        #[source]
        source: std::io::Error,
    },
}

/// Key → body store shared by every connection handler.
///
/// Implementations must make `write` atomic with respect to `read`: a
/// concurrent reader sees either the previous body or the new one, never a
/// partial write.
pub trait CacheStore: Send + Sync + 'static {
    /// True iff a body was previously written under `key`.
    fn exists(&self, key: &CacheKey) -> impl Future<Output = bool> + Send;

    fn read(&self, key: &CacheKey) -> impl Future<Output = Result<String, CacheError>> + Send;

    /// Stores `body` under `key`, replacing any previous value.
    fn write(
        &self,
        key: &CacheKey,
        body: &str,
    ) -> impl Future<Output = Result<(), CacheError>> + Send;
}
