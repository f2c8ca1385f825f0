use std::sync::Arc;

use pxcache_cache::CacheStore;
use pxcache_proxy::OriginClient;
use tokio::sync::Semaphore;
use tracing::info;

use super::Master;

impl<S, O> Master<S, O>
where
    S: CacheStore,
    O: OriginClient,
{
    pub(super) fn log_startup(&self) {
        info!(target: "pxcache::master", "Starting PXCACHE MASTER");
        info!(
            target: "pxcache::master",
            worker_connections = self.cfg.global.worker_connections(),
            log_level = %self.cfg.global.log_level(),
            client_read_timeout_secs = self.cfg.http.client_read_timeout_secs,
            proxy_connect_timeout_secs = self.cfg.http.proxy_connect_timeout_secs,
            proxy_read_timeout_secs = self.cfg.http.proxy_read_timeout_secs,
            cache_backend = ?self.cfg.cache.backend,
            "Global configuration loaded"
        );
    }

    pub(super) fn init_semaphore(&self) -> Arc<Semaphore> {
        let max_conns = usize::from(self.cfg.global.worker_connections());
        let semaphore = Arc::new(Semaphore::new(max_conns));
        info!(
            target: "pxcache::master",
            max_conns,
            "Global connection semaphore initialized"
        );
        semaphore
    }
}
