use serde::Deserialize;

// =======================================================
// CACHE BACKEND (enum tipado)
// =======================================================
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
pub enum CacheBackend {
    #[default]
    #[serde(rename = "fs")]
    Fs,
    #[serde(rename = "memory")]
    Memory,
}

// =======================================================
// CACHE CONFIG + DEFAULTS
// =======================================================
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CacheConfig {
    pub backend: CacheBackend,
    /// Directory holding one file per cached URI (fs backend only).
    pub dir: String,
    /// File extension appended to each cache key, without the dot.
    pub extension: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Fs,
            dir: "./cache".into(),
            extension: "html".into(),
        }
    }
}

impl CacheConfig {
    pub fn backend(&self) -> CacheBackend {
        self.backend
    }

    pub fn dir(&self) -> &str {
        &self.dir
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }
}
