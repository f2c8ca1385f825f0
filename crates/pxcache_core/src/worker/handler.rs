use pxcache_cache::{CacheError, CacheKey, CacheStore};
use pxcache_http::{
    build_client_response, parse_body, parse_request, parse_status_code, resolve, CodecError,
    Request, ResolvedTarget, INTERNAL_ERROR_BODY,
};
use pxcache_proxy::OriginClient;
use tracing::{debug, info, warn};

/// What the client gets back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub cache_hit: bool,
    pub status_code: String,
    pub body: String,
}

impl Reply {
    fn new(cache_hit: bool, status_code: &str, body: String) -> Self {
        Self {
            cache_hit,
            status_code: status_code.to_string(),
            body,
        }
    }

    pub fn internal_error() -> Self {
        Self::new(false, "500", INTERNAL_ERROR_BODY.to_string())
    }

    pub fn to_wire(&self) -> String {
        build_client_response(self.cache_hit, &self.status_code, &self.body)
    }
}

/// Which path a request took through the handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerOutcome {
    /// Served from the cache store.
    CacheHit,
    /// Forwarded to the origin, which answered with `origin_status`.
    CacheMiss { origin_status: String },
    /// Request line or URI failed validation; nothing was looked up.
    Rejected(String),
    /// The origin could not be reached or sent an unreadable response.
    OriginFailed,
}

/// Per-request pipeline: parse → resolve → cache lookup → forward.
///
/// Holds the cache store, the only state shared across connections, and
/// the origin client.
pub struct ProxyHandler<S, O> {
    cache: S,
    origin: O,
}

impl<S, O> ProxyHandler<S, O>
where
    S: CacheStore,
    O: OriginClient,
{
    pub fn new(cache: S, origin: O) -> Self {
        Self { cache, origin }
    }

    pub fn cache(&self) -> &S {
        &self.cache
    }

    /// Computes the reply for one raw client message. Never fails: every
    /// error becomes a 500 reply.
    pub async fn respond(&self, raw: &str) -> (Reply, HandlerOutcome) {
        let (request, target) = match parse_and_resolve(raw) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(target: "pxcache::worker", error = %e, "Rejecting client request");
                return (Reply::internal_error(), HandlerOutcome::Rejected(e.to_string()));
            }
        };

        debug!(
            target: "pxcache::worker",
            uri = %request.uri,
            host = %target.host,
            port = target.port,
            path = %target.path,
            "Resolved request target"
        );

        let key = CacheKey::from_uri(&request.uri);

        if let Some(body) = self.lookup(&key).await {
            info!(target: "pxcache::worker", cache_key = %key, "Cache hit");
            return (Reply::new(true, "200", body), HandlerOutcome::CacheHit);
        }

        info!(target: "pxcache::worker", cache_key = %key, "Cache miss; forwarding to origin");
        self.forward(&request, &target, &key).await
    }

    async fn lookup(&self, key: &CacheKey) -> Option<String> {
        if !self.cache.exists(key).await {
            return None;
        }

        match self.cache.read(key).await {
            Ok(body) => Some(body),
            Err(CacheError::NotFound(_)) => {
                debug!(target: "pxcache::worker", cache_key = %key, "Cache entry vanished before read");
                None
            }
            Err(e) => {
                warn!(target: "pxcache::worker", error = %e, "Cache read failed; treating as miss");
                None
            }
        }
    }

    async fn forward(
        &self,
        request: &Request,
        target: &ResolvedTarget,
        key: &CacheKey,
    ) -> (Reply, HandlerOutcome) {
        let raw = match self
            .origin
            .fetch(&request.method, &target.host, &target.path, target.port)
            .await
        {
            Ok(raw) => raw,
            Err(e) => {
                warn!(target: "pxcache::worker", error = %e, "Origin fetch failed");
                return (Reply::internal_error(), HandlerOutcome::OriginFailed);
            }
        };

        let (status, body) = match split_origin_response(&raw) {
            Ok(parts) => parts,
            Err(e) => {
                warn!(target: "pxcache::worker", error = %e, "Unreadable origin response");
                return (Reply::internal_error(), HandlerOutcome::OriginFailed);
            }
        };

        let reply = match status.as_str() {
            "200" => {
                if let Err(e) = self.cache.write(key, &body).await {
                    warn!(target: "pxcache::worker", error = %e, "Failed to store response in cache");
                }
                Reply::new(false, "200", body)
            }
            "404" => {
                debug!(target: "pxcache::worker", cache_key = %key, "Origin returned 404; not caching");
                Reply::new(false, "404", body)
            }
            other => {
                // Only 200 and 404 are relayed; anything else becomes a plain 500.
                info!(
                    target: "pxcache::worker",
                    origin_status = %other,
                    "Origin status not relayed; answering 500"
                );
                Reply::internal_error()
            }
        };

        (
            reply,
            HandlerOutcome::CacheMiss {
                origin_status: status,
            },
        )
    }
}

fn parse_and_resolve(raw: &str) -> Result<(Request, ResolvedTarget), CodecError> {
    let request = parse_request(raw)?;
    let target = resolve(&request.uri)?;
    Ok((request, target))
}

fn split_origin_response(raw: &str) -> Result<(String, String), CodecError> {
    Ok((parse_status_code(raw)?, parse_body(raw)?))
}
