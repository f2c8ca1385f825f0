use std::{net::SocketAddr, sync::Arc};

use pxcache_cache::CacheStore;
use pxcache_config::ProxyConfig;
use pxcache_proxy::OriginClient;
use tokio::net::TcpListener;
use tracing::{info, instrument, warn};

use crate::worker::ProxyHandler;

mod accept;
mod startup;

pub use accept::bind_listener;

/// Owns the listening socket and the shared handler.
pub struct Master<S, O> {
    cfg: Arc<ProxyConfig>,
    listen: SocketAddr,
    handler: Arc<ProxyHandler<S, O>>,
}

impl<S, O> Master<S, O>
where
    S: CacheStore,
    O: OriginClient,
{
    pub fn new(cfg: ProxyConfig, listen: SocketAddr, handler: ProxyHandler<S, O>) -> Self {
        Self {
            cfg: Arc::new(cfg),
            listen,
            handler: Arc::new(handler),
        }
    }

    /// Binds the listen address and serves until Ctrl+C.
    #[instrument(skip(self), fields(
        listen = %self.listen,
        worker_connections = self.cfg.global.worker_connections(),
    ))]
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = bind_listener(self.listen).await?;
        self.serve(listener).await
    }

    /// Serves connections from an already bound listener until Ctrl+C.
    pub async fn serve(self, listener: TcpListener) -> anyhow::Result<()> {
        self.log_startup();
        let semaphore = self.init_semaphore();
        let listen_addr = listener.local_addr()?;

        info!(
            target: "pxcache::master",
            listen = %listen_addr,
            "Master initialized. Waiting for incoming connections (Ctrl+C to stop)..."
        );

        tokio::select! {
            res = accept::accept_loop(
                listener,
                listen_addr,
                semaphore,
                self.handler.clone(),
                self.cfg.clone(),
            ) => res,
            _ = tokio::signal::ctrl_c() => {
                warn!(target: "pxcache::master", "Shutdown signal received; no longer accepting connections");
                Ok(())
            }
        }
    }
}
