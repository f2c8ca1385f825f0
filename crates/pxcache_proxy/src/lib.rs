//! Origin client for the forward proxy.
//!
//! One TCP connection per request: connect, write the request, read until
//! the origin closes, shut down. No pooling, no retries.

use std::future::Future;

use pxcache_config::HttpConfig;
use pxcache_http::{build_origin_request, origin_addr};
use tokio::{
    io::AsyncWriteExt,
    net::TcpStream,
    time::{timeout, Duration},
};
use tracing::{debug, info, instrument, warn};

mod error;
mod response;

pub use error::OriginError;

/// Fetches a resource from an origin server and returns the raw response.
pub trait OriginClient: Send + Sync + 'static {
    fn fetch(
        &self,
        method: &str,
        host: &str,
        path: &str,
        port: u16,
    ) -> impl Future<Output = Result<String, OriginError>> + Send;
}

// =======================================================
// TCP ORIGIN CLIENT
// =======================================================

/// Bounded at every step: connect, write and each read have their own
/// timeout, and the total response size is capped.
#[derive(Debug, Clone)]
pub struct TcpOriginClient {
    connect_timeout: Duration,
    write_timeout: Duration,
    read_timeout: Duration,
    max_response_bytes: usize,
}

impl TcpOriginClient {
    pub fn new(
        connect_timeout: Duration,
        write_timeout: Duration,
        read_timeout: Duration,
        max_response_bytes: usize,
    ) -> Self {
        Self {
            connect_timeout,
            write_timeout,
            read_timeout,
            max_response_bytes,
        }
    }

    pub fn from_config(http: &HttpConfig) -> Self {
        Self::new(
            http.proxy_connect_timeout(),
            http.proxy_write_timeout(),
            http.proxy_read_timeout(),
            http.max_upstream_response_bytes(),
        )
    }
}

impl OriginClient for TcpOriginClient {
    #[instrument(skip(self))]
    async fn fetch(
        &self,
        method: &str,
        host: &str,
        path: &str,
        port: u16,
    ) -> Result<String, OriginError> {
        let addr = origin_addr(host, port);
        let mut stream = connect_with_timeout(host, port, &addr, self.connect_timeout).await?;

        let request = build_origin_request(method, host, port, path);
        debug!(
            target: "pxcache::proxy",
            origin = %addr,
            %method,
            %path,
            "Sending request to origin"
        );

        match timeout(self.write_timeout, stream.write_all(request.as_bytes())).await {
            Ok(Ok(())) => {}
            Ok(Err(source)) => return Err(OriginError::Io { addr, source }),
            Err(_) => {
                return Err(OriginError::Timeout {
                    addr,
                    phase: "write",
                });
            }
        }

        let raw = response::read_until_close(
            &mut stream,
            &addr,
            self.read_timeout,
            self.max_response_bytes,
        )
        .await;

        if let Err(e) = stream.shutdown().await {
            warn!(target: "pxcache::proxy", origin = %addr, error = ?e, "Origin shutdown failed");
        }

        let raw = raw?;
        info!(
            target: "pxcache::proxy",
            origin = %addr,
            bytes = raw.len(),
            "Origin response received"
        );
        Ok(raw)
    }
}

async fn connect_with_timeout(
    host: &str,
    port: u16,
    addr: &str,
    timeout_dur: Duration,
) -> Result<TcpStream, OriginError> {
    match timeout(timeout_dur, TcpStream::connect((host, port))).await {
        Ok(Ok(stream)) => Ok(stream),
        Ok(Err(source)) => Err(OriginError::Connection {
            addr: addr.to_string(),
            source,
        }),
        Err(_) => Err(OriginError::Timeout {
            addr: addr.to_string(),
            phase: "connect",
        }),
    }
}
