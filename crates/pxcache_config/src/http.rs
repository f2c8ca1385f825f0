use std::time::Duration;

use serde::Deserialize;

// =======================================================
// HTTP CONFIG + DEFAULTS
// =======================================================
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    // Timeouts (seconds)
    pub client_read_timeout_secs: u64,
    pub proxy_connect_timeout_secs: u64,
    pub proxy_read_timeout_secs: u64,
    pub proxy_write_timeout_secs: u64,

    // Limits (bytes)
    pub max_request_bytes: u64,
    pub max_upstream_response_bytes: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            client_read_timeout_secs: 15,
            proxy_connect_timeout_secs: 5,
            proxy_read_timeout_secs: 30,
            proxy_write_timeout_secs: 30,
            max_request_bytes: 64 * 1024,
            max_upstream_response_bytes: 10 * 1024 * 1024,
        }
    }
}

impl HttpConfig {
    pub fn client_read_timeout(&self) -> Duration {
        Duration::from_secs(self.client_read_timeout_secs)
    }

    pub fn proxy_connect_timeout(&self) -> Duration {
        Duration::from_secs(self.proxy_connect_timeout_secs)
    }

    pub fn proxy_read_timeout(&self) -> Duration {
        Duration::from_secs(self.proxy_read_timeout_secs)
    }

    pub fn proxy_write_timeout(&self) -> Duration {
        Duration::from_secs(self.proxy_write_timeout_secs)
    }

    pub fn max_request_bytes(&self) -> usize {
        self.max_request_bytes as usize
    }

    pub fn max_upstream_response_bytes(&self) -> usize {
        self.max_upstream_response_bytes as usize
    }

    pub(crate) fn apply_defaults_from(&mut self, defaults: &HttpConfig) {
        if self.client_read_timeout_secs == 0 {
            self.client_read_timeout_secs = defaults.client_read_timeout_secs;
        }
        if self.proxy_connect_timeout_secs == 0 {
            self.proxy_connect_timeout_secs = defaults.proxy_connect_timeout_secs;
        }
        if self.proxy_read_timeout_secs == 0 {
            self.proxy_read_timeout_secs = defaults.proxy_read_timeout_secs;
        }
        if self.proxy_write_timeout_secs == 0 {
            self.proxy_write_timeout_secs = defaults.proxy_write_timeout_secs;
        }
        if self.max_request_bytes == 0 {
            self.max_request_bytes = defaults.max_request_bytes;
        }
        if self.max_upstream_response_bytes == 0 {
            self.max_upstream_response_bytes = defaults.max_upstream_response_bytes;
        }
    }
}
