mod cache;
mod global;
mod http;
mod pxcache;
mod validation;

pub use cache::{CacheBackend, CacheConfig};
pub use global::GlobalConfig;
pub use http::HttpConfig;
pub use pxcache::ProxyConfig;
pub use validation::ConfigReport;
