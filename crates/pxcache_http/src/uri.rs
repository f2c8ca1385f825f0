use url::{Host, Url};

use crate::CodecError;

/// Port used when the URI does not name one.
pub const DEFAULT_PORT: u16 = 80;

const ACCEPTED_SCHEMES: [&str; 2] = ["http", "https"];

/// Where an absolute URI points: origin host, port and request-target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub host: String,
    pub port: u16,
    pub path: String,
}

/// Splits an absolute `http`/`https` URI into host, port and path.
///
/// - port defaults to 80 when the URI has none
/// - path is the raw request-target, "/" when empty, fragment dropped
pub fn resolve(uri: &str) -> Result<ResolvedTarget, CodecError> {
    let parsed = Url::parse(uri)
        .map_err(|e| CodecError::invalid_uri(uri, format!("URI must be in absolute form ({e})")))?;

    if !ACCEPTED_SCHEMES.contains(&parsed.scheme()) {
        return Err(CodecError::invalid_uri(
            uri,
            format!("unsupported scheme '{}'", parsed.scheme()),
        ));
    }

    let host = match parsed.host() {
        Some(Host::Domain(d)) if !d.is_empty() => d.to_string(),
        Some(Host::Ipv4(addr)) => addr.to_string(),
        Some(Host::Ipv6(addr)) => addr.to_string(),
        _ => return Err(CodecError::invalid_uri(uri, "missing host")),
    };

    // `Url` hides a port equal to the scheme default (443 for https), so
    // recover an explicit one from the authority before falling back to 80.
    let port = parsed
        .port()
        .or_else(|| explicit_port(uri))
        .unwrap_or(DEFAULT_PORT);

    // Forwarded verbatim; `Url::path` would collapse dot segments.
    let path = raw_request_target(uri);

    Ok(ResolvedTarget { host, port, path })
}

/// `Host` header value: IPv6 literals bracketed, port omitted when it is 80.
pub fn host_header(host: &str, port: u16) -> String {
    let host = bracket_ipv6(host);
    if port == DEFAULT_PORT {
        host
    } else {
        format!("{host}:{port}")
    }
}

/// `host:port` form used in logs and errors.
pub fn origin_addr(host: &str, port: u16) -> String {
    format!("{}:{port}", bracket_ipv6(host))
}

fn bracket_ipv6(host: &str) -> String {
    if host.contains(':') {
        format!("[{host}]")
    } else {
        host.to_string()
    }
}

/// Splits what follows `scheme://` into authority and request-target.
fn split_authority(uri: &str) -> Option<(&str, &str)> {
    let (_, rest) = uri.split_once("://")?;
    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    Some(rest.split_at(end))
}

fn raw_request_target(uri: &str) -> String {
    let target = split_authority(uri).map_or("", |(_, target)| target);
    let target = target.split('#').next().unwrap_or_default();
    match target {
        "" => "/".to_string(),
        t if t.starts_with('?') => format!("/{t}"),
        t => t.to_string(),
    }
}

fn explicit_port(uri: &str) -> Option<u16> {
    let (authority, _) = split_authority(uri)?;
    let host_port = authority.rsplit('@').next()?;
    let (_, port) = host_port.rsplit_once(':')?;
    if port.contains(']') {
        return None;
    }
    port.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_host_and_path_with_default_port() {
        let target = resolve("http://example.com/index.html").expect("expected ok");
        assert_eq!(
            target,
            ResolvedTarget {
                host: "example.com".into(),
                port: 80,
                path: "/index.html".into(),
            }
        );
    }

    #[test]
    fn defaults_path_to_root() {
        let target = resolve("http://example.com").expect("expected ok");
        assert_eq!(target.path, "/");
    }

    #[test]
    fn keeps_explicit_port_and_query() {
        let target = resolve("http://localhost:8081/search?q=rust").expect("expected ok");
        assert_eq!(target.host, "localhost");
        assert_eq!(target.port, 8081);
        assert_eq!(target.path, "/search?q=rust");
    }

    #[test]
    fn https_without_port_still_defaults_to_80() {
        let target = resolve("https://example.com/a").expect("expected ok");
        assert_eq!(target.port, 80);
    }

    #[test]
    fn https_with_explicit_443_keeps_it() {
        let target = resolve("https://example.com:443/a").expect("expected ok");
        assert_eq!(target.port, 443);
    }

    #[test]
    fn ipv6_host_is_unbracketed() {
        let target = resolve("http://[::1]:9000/").expect("expected ok");
        assert_eq!(target.host, "::1");
        assert_eq!(target.port, 9000);
    }

    #[test]
    fn request_target_is_taken_verbatim() {
        let target = resolve("http://h/a/./b/../c%7e?x=1").expect("expected ok");
        assert_eq!(target.path, "/a/./b/../c%7e?x=1");

        let target = resolve("http://h/a/./b").expect("expected ok");
        assert_eq!(target.path, "/a/./b");
    }

    #[test]
    fn query_without_path_and_fragment_are_normalised() {
        assert_eq!(resolve("http://h?q=1").expect("expected ok").path, "/?q=1");
        assert_eq!(resolve("http://h/p#frag").expect("expected ok").path, "/p");
        assert_eq!(resolve("http://h#frag").expect("expected ok").path, "/");
    }

    #[test]
    fn host_header_brackets_ipv6_and_keeps_non_default_port() {
        assert_eq!(host_header("example.com", 80), "example.com");
        assert_eq!(host_header("example.com", 8080), "example.com:8080");
        assert_eq!(host_header("::1", 80), "[::1]");
        assert_eq!(host_header("::1", 9000), "[::1]:9000");
        assert_eq!(origin_addr("::1", 80), "[::1]:80");
        assert_eq!(origin_addr("localhost", 80), "localhost:80");
    }

    #[test]
    fn rejects_relative_uri() {
        let err = resolve("/index.html").unwrap_err();
        assert!(matches!(err, CodecError::InvalidUri { .. }));
    }

    #[test]
    fn rejects_non_web_scheme() {
        let err = resolve("ftp://example.com/file").unwrap_err();
        assert!(matches!(err, CodecError::InvalidUri { .. }));
    }

    #[test]
    fn any_web_uri_with_host_resolves() {
        for uri in [
            "http://a.b",
            "http://a.b/",
            "HTTP://A.B/x/y",
            "https://sub.domain.example:8443/deep/path?x=1",
            "http://127.0.0.1/",
        ] {
            assert!(resolve(uri).is_ok(), "{uri} should resolve");
        }
    }
}
