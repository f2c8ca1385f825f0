use std::fmt;

/// Storage-safe identifier derived from a request URI.
///
/// `http://example.com/index.html` becomes `example.com_index.html`.
/// Distinct URIs can map to the same key (`/a_b` vs `/a/b`).
#[derive(Hash, Eq, PartialEq, Debug, Clone)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn from_uri(uri: &str) -> Self {
        let without_scheme = uri.split_once("://").map_or(uri, |(_, rest)| rest);
        Self(without_scheme.replace('/', "_"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::CacheKey;

    #[test]
    fn strips_scheme_and_replaces_slashes() {
        let key = CacheKey::from_uri("http://example.com/index.html");
        assert_eq!(key.as_str(), "example.com_index.html");
    }

    #[test]
    fn root_path_keeps_trailing_underscore() {
        assert_eq!(CacheKey::from_uri("http://example.com/").as_str(), "example.com_");
        assert_eq!(CacheKey::from_uri("http://example.com").as_str(), "example.com");
    }

    #[test]
    fn keeps_port_and_query() {
        let key = CacheKey::from_uri("http://localhost:8000/a/b?c=d");
        assert_eq!(key.as_str(), "localhost:8000_a_b?c=d");
    }

    #[test]
    fn known_collision() {
        assert_eq!(
            CacheKey::from_uri("http://h/a_b"),
            CacheKey::from_uri("http://h/a/b")
        );
    }
}
