use std::{net::SocketAddr, sync::Arc};

use pxcache_cache::CacheStore;
use pxcache_config::ProxyConfig;
use pxcache_proxy::OriginClient;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, error, info, instrument, Instrument};

use crate::worker::{handle_connection, ProxyHandler};

pub async fn bind_listener(listen_addr: SocketAddr) -> anyhow::Result<TcpListener> {
    info!(
        target: "pxcache::master",
        listen = %listen_addr,
        "Binding listener"
    );

    match TcpListener::bind(listen_addr).await {
        Ok(listener) => {
            info!(
                target: "pxcache::master",
                listen = %listen_addr,
                "Bind() successful"
            );
            Ok(listener)
        }
        Err(e) => {
            error!(
                target: "pxcache::master",
                listen = %listen_addr,
                error = ?e,
                "Failed to bind listener"
            );
            Err(e.into())
        }
    }
}

struct AcceptedConn {
    stream: TcpStream,
    addr: SocketAddr,
    permit: OwnedSemaphorePermit,
}

async fn accept_with_permit(
    listener: &TcpListener,
    listen_addr: SocketAddr,
    semaphore: &Arc<Semaphore>,
) -> anyhow::Result<AcceptedConn> {
    let (stream, addr) = match listener.accept().await {
        Ok(pair) => pair,
        Err(e) => {
            error!(
                target: "pxcache::master",
                listen = %listen_addr,
                error = ?e,
                "Failed to accept connection"
            );
            return Err(e.into());
        }
    };

    let permit = match semaphore.clone().acquire_owned().await {
        Ok(p) => p,
        Err(e) => {
            error!(
                target: "pxcache::master",
                listen = %listen_addr,
                error = ?e,
                "Failed to acquire connection permit"
            );
            return Err(e.into());
        }
    };

    debug!(
        target: "pxcache::master",
        listen = %listen_addr,
        client_addr = %addr,
        available_permits = semaphore.available_permits(),
        "Connection accepted"
    );

    Ok(AcceptedConn {
        stream,
        addr,
        permit,
    })
}

/// Accepts connections forever, one task per connection.
///
/// The handler's cache store is the only state the tasks share.
#[instrument(
    skip(listener, semaphore, handler, cfg),
    fields(
        listen = %listen_addr,
        available_permits = semaphore.available_permits(),
    )
)]
pub(crate) async fn accept_loop<S, O>(
    listener: TcpListener,
    listen_addr: SocketAddr,
    semaphore: Arc<Semaphore>,
    handler: Arc<ProxyHandler<S, O>>,
    cfg: Arc<ProxyConfig>,
) -> anyhow::Result<()>
where
    S: CacheStore,
    O: OriginClient,
{
    info!(
        target: "pxcache::master",
        listen = %listen_addr,
        "accept_loop started for listening socket"
    );

    loop {
        let AcceptedConn {
            stream,
            addr,
            permit,
        } = accept_with_permit(&listener, listen_addr, &semaphore).await?;

        let handler_clone = handler.clone();
        let cfg_clone = cfg.clone();
        let span = tracing::info_span!(
            "worker_connection",
            client_addr = %addr,
            listen = %listen_addr,
        );

        tokio::spawn(
            async move {
                let _permit = permit;

                debug!(
                    target: "pxcache::worker",
                    "Worker spawned for incoming connection"
                );

                match handle_connection(Box::new(stream), addr, handler_clone, cfg_clone).await {
                    Ok(outcome) => {
                        debug!(
                            target: "pxcache::worker",
                            client_addr = %addr,
                            outcome = ?outcome,
                            "Connection handled successfully"
                        );
                    }
                    Err(e) => {
                        error!(
                            target: "pxcache::worker",
                            client_addr = %addr,
                            error = ?e,
                            "Error while handling connection"
                        );
                    }
                }

                debug!(
                    target: "pxcache::master",
                    client_addr = %addr,
                    "Permit released after connection closed"
                );
            }
            .instrument(span),
        );
    }
}
