//! Disk-backed cache: one file per key under the cache directory.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::atomic::{AtomicU64, Ordering},
};

use tokio::fs;
use tracing::{debug, warn};

use crate::{CacheError, CacheKey, CacheStore};

#[derive(Debug)]
pub struct FsCacheStore {
    dir: PathBuf,
    extension: String,
    tmp_seq: AtomicU64,
}

impl FsCacheStore {
    pub fn new(dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.into(),
            tmp_seq: AtomicU64::new(0),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Creates the cache directory if it does not exist yet.
    pub async fn init(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir).await?;
        debug!(target: "pxcache::cache", dir = %self.dir.display(), "Cache directory ready");
        Ok(())
    }

    fn entry_path(&self, key: &CacheKey) -> PathBuf {
        if self.extension.is_empty() {
            self.dir.join(key.as_str())
        } else {
            self.dir.join(format!("{}.{}", key.as_str(), self.extension))
        }
    }

    /// Temp files live next to the target so the final rename stays on one
    /// file system.
    fn tmp_path(&self, key: &CacheKey) -> PathBuf {
        let seq = self.tmp_seq.fetch_add(1, Ordering::Relaxed);
        self.dir
            .join(format!(".{}.{}.{}.tmp", key.as_str(), std::process::id(), seq))
    }
}

impl CacheStore for FsCacheStore {
    async fn exists(&self, key: &CacheKey) -> bool {
        fs::try_exists(self.entry_path(key)).await.unwrap_or(false)
    }

    async fn read(&self, key: &CacheKey) -> Result<String, CacheError> {
        match fs::read_to_string(self.entry_path(key)).await {
            Ok(body) => {
                debug!(target: "pxcache::cache", cache_key = %key, layer = "disk", "Cache hit");
                Ok(body)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Err(CacheError::NotFound(key.clone())),
            Err(source) => Err(CacheError::Io {
                key: key.clone(),
                source,
            }),
        }
    }

    async fn write(&self, key: &CacheKey, body: &str) -> Result<(), CacheError> {
        let target = self.entry_path(key);
        let tmp = self.tmp_path(key);
        let io_err = |source| CacheError::Io {
            key: key.clone(),
            source,
        };

        fs::write(&tmp, body).await.map_err(io_err)?;

        if let Err(e) = fs::rename(&tmp, &target).await {
            if let Err(cleanup) = fs::remove_file(&tmp).await {
                warn!(
                    target: "pxcache::cache",
                    tmp = %tmp.display(),
                    error = ?cleanup,
                    "Failed to remove temporary cache file"
                );
            }
            return Err(io_err(e));
        }

        debug!(
            target: "pxcache::cache",
            cache_key = %key,
            layer = "disk",
            path = %target.display(),
            bytes = body.len(),
            "Cache entry stored"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn init_creates_missing_directory() {
        let tmp = tempdir().unwrap();
        let dir = tmp.path().join("nested").join("cache");
        let store = FsCacheStore::new(&dir, "html");
        store.init().await.unwrap();
        assert!(dir.is_dir());
    }

    #[tokio::test]
    async fn empty_store_reports_missing() {
        let tmp = tempdir().unwrap();
        let store = FsCacheStore::new(tmp.path(), "html");
        let key = CacheKey::from_uri("http://example.com/index.html");
        assert!(!store.exists(&key).await);
        assert!(matches!(store.read(&key).await, Err(CacheError::NotFound(_))));
    }

    #[tokio::test]
    async fn writes_one_file_per_key() {
        let tmp = tempdir().unwrap();
        let store = FsCacheStore::new(tmp.path(), "html");
        let key = CacheKey::from_uri("http://example.com/index.html");

        store.write(&key, "hello\r\n").await.unwrap();

        let on_disk = std::fs::read_to_string(tmp.path().join("example.com_index.html.html"))
            .unwrap();
        assert_eq!(on_disk, "hello\r\n");
        assert!(store.exists(&key).await);
        assert_eq!(store.read(&key).await.unwrap(), "hello\r\n");
    }

    #[tokio::test]
    async fn overwrite_leaves_no_temp_files() {
        let tmp = tempdir().unwrap();
        let store = FsCacheStore::new(tmp.path(), "");
        let key = CacheKey::from_uri("http://example.com/a");

        store.write(&key, "first").await.unwrap();
        store.write(&key, "second").await.unwrap();

        assert_eq!(store.read(&key).await.unwrap(), "second");
        let names: Vec<String> = std::fs::read_dir(tmp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["example.com_a".to_string()]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn readers_never_see_partial_bodies() {
        const BODY_LEN: usize = 256 * 1024;
        const ROUNDS: usize = 20;

        let tmp = tempdir().unwrap();
        let store = std::sync::Arc::new(FsCacheStore::new(tmp.path(), "html"));
        let key = CacheKey::from_uri("http://example.com/big");
        let body_a = "a".repeat(BODY_LEN);
        let body_b = "b".repeat(BODY_LEN);
        store.write(&key, &body_a).await.unwrap();

        let writer = {
            let store = store.clone();
            let key = key.clone();
            tokio::spawn(async move {
                for round in 0..ROUNDS {
                    let body = if round % 2 == 0 { &body_b } else { &body_a };
                    store.write(&key, body).await.unwrap();
                }
            })
        };

        let mut readers = Vec::new();
        for _ in 0..3 {
            let store = store.clone();
            let key = key.clone();
            readers.push(tokio::spawn(async move {
                for _ in 0..ROUNDS {
                    let body = store.read(&key).await.unwrap();
                    assert_eq!(body.len(), BODY_LEN);
                    let first = body.as_bytes()[0];
                    assert!(first == b'a' || first == b'b');
                    assert!(body.bytes().all(|b| b == first), "mixed body observed");
                }
            }));
        }

        writer.await.unwrap();
        for reader in readers {
            reader.await.unwrap();
        }
    }

    #[tokio::test]
    async fn write_into_missing_directory_is_io_error() {
        let tmp = tempdir().unwrap();
        let store = FsCacheStore::new(tmp.path().join("absent"), "html");
        let key = CacheKey::from_uri("http://example.com/");
        let err = store.write(&key, "x").await.unwrap_err();
        assert!(matches!(err, CacheError::Io { .. }));
    }
}
