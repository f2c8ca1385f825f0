use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Installs the global subscriber. `RUST_LOG` overrides `default_level`.
pub fn init_tracing(default_level: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| level_filter(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .compact()
                .with_target(true)
                .with_thread_ids(false),
        )
        .init();
}

/// Filter applying `level` to every target, the proxy's own included.
fn level_filter(level: &str) -> EnvFilter {
    EnvFilter::new(level)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;

    fn enabled_under(level: &str, check: impl FnOnce() -> bool) -> bool {
        let subscriber = tracing_subscriber::registry().with(level_filter(level));
        tracing::subscriber::with_default(subscriber, check)
    }

    #[test]
    fn warn_level_silences_proxy_debug_and_info() {
        assert!(!enabled_under("warn", || {
            tracing::enabled!(target: "pxcache::worker", Level::DEBUG)
        }));
        assert!(!enabled_under("warn", || {
            tracing::enabled!(target: "pxcache::cache", Level::INFO)
        }));
        assert!(enabled_under("warn", || {
            tracing::enabled!(target: "pxcache::worker", Level::WARN)
        }));
    }

    #[test]
    fn debug_level_enables_proxy_debug() {
        assert!(enabled_under("debug", || {
            tracing::enabled!(target: "pxcache::proxy", Level::DEBUG)
        }));
        assert!(!enabled_under("debug", || {
            tracing::enabled!(target: "pxcache::proxy", Level::TRACE)
        }));
    }
}
