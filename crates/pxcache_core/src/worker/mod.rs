//! Per-connection proxy handler.
//!
//! Reads one request from the client, runs it through the cache/origin
//! pipeline, writes one response and closes the connection.

use std::{net::SocketAddr, sync::Arc};

use pxcache_cache::CacheStore;
use pxcache_config::ProxyConfig;
use pxcache_http::responses::send_500;
use pxcache_proxy::OriginClient;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, instrument, warn};

mod handler;
mod request;

pub use handler::{HandlerOutcome, ProxyHandler, Reply};
use request::{discard_input, read_request, RequestRead};

pub trait ClientStream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T> ClientStream for T where T: AsyncRead + AsyncWrite + Unpin + Send {}

/// Entry point for a "logical worker" that handles a single connection.
///
/// Returns `None` when the client went away without sending anything.
/// The stream is shut down and dropped on every path.
#[instrument(
    skip(stream, handler, cfg),
    fields(
        client = %client_addr,
    )
)]
pub async fn handle_connection<S, O>(
    mut stream: Box<dyn ClientStream>,
    client_addr: SocketAddr,
    handler: Arc<ProxyHandler<S, O>>,
    cfg: Arc<ProxyConfig>,
) -> anyhow::Result<Option<HandlerOutcome>>
where
    S: CacheStore,
    O: OriginClient,
{
    info!(target: "pxcache::worker", "Handling new client connection");

    let result = serve_request(stream.as_mut(), &handler, &cfg).await;

    if let Err(e) = stream.shutdown().await {
        debug!(target: "pxcache::worker", error = ?e, "Client shutdown failed");
    }
    if matches!(result, Ok(Some(HandlerOutcome::Rejected(_)))) {
        discard_input(stream.as_mut()).await;
    }
    drop(stream);

    info!(
        target: "pxcache::worker",
        %client_addr,
        "Finished handling connection"
    );

    result
}

async fn serve_request<S, O>(
    stream: &mut dyn ClientStream,
    handler: &ProxyHandler<S, O>,
    cfg: &ProxyConfig,
) -> anyhow::Result<Option<HandlerOutcome>>
where
    S: CacheStore,
    O: OriginClient,
{
    let read_timeout = cfg.http.client_read_timeout();
    let max_bytes = cfg.http.max_request_bytes();

    let raw = match read_request(stream, read_timeout, max_bytes).await? {
        RequestRead::Received(raw) => raw,
        RequestRead::Idle => {
            debug!(target: "pxcache::worker", "Client sent nothing; closing connection");
            return Ok(None);
        }
        RequestRead::TooLarge => {
            warn!(
                target: "pxcache::worker",
                max_bytes,
                "Client request exceeds size limit"
            );
            send_500(stream).await?;
            return Ok(Some(HandlerOutcome::Rejected(format!(
                "request larger than {max_bytes} bytes"
            ))));
        }
    };

    let (reply, outcome) = handler.respond(&raw).await;

    stream.write_all(reply.to_wire().as_bytes()).await?;
    stream.flush().await?;

    debug!(
        target: "pxcache::worker",
        status = %reply.status_code,
        cache_hit = reply.cache_hit,
        outcome = ?outcome,
        "Response sent to client"
    );

    Ok(Some(outcome))
}
