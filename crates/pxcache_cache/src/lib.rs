//! Response body cache for the forward proxy.
//!
//! Entries are keyed by a storage-safe rendering of the request URI and are
//! never evicted. Only successful origin responses are ever written.

mod fs;
mod key;
mod memory;
mod store;

pub use fs::FsCacheStore;
pub use key::CacheKey;
pub use memory::MemoryCacheStore;
pub use store::{CacheError, CacheStore};
