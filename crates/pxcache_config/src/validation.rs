use std::fmt;
use std::path::Path;

use crate::{CacheBackend, ProxyConfig};

const LARGE_RESPONSE_LIMIT_BYTES: u64 = 256 * 1024 * 1024;

/// Validation output for a loaded proxy configuration.
#[derive(Debug, Default)]
pub struct ConfigReport {
    warnings: Vec<String>,
    errors: Vec<String>,
}

impl ConfigReport {
    /// Returns true when at least one error was found.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }
}

impl fmt::Display for ConfigReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sections = [("Errors", &self.errors), ("Warnings", &self.warnings)];
        let mut first = true;
        for (title, items) in sections.into_iter().filter(|(_, items)| !items.is_empty()) {
            if !first {
                writeln!(f)?;
            }
            first = false;
            writeln!(f, "{title}:")?;
            for item in items {
                writeln!(f, "  - {item}")?;
            }
        }
        Ok(())
    }
}

pub(crate) fn validate(cfg: &ProxyConfig) -> ConfigReport {
    let mut report = ConfigReport::default();

    validate_http(cfg, &mut report);
    validate_cache(cfg, &mut report);

    report
}

fn validate_http(cfg: &ProxyConfig, report: &mut ConfigReport) {
    if cfg.http.max_upstream_response_bytes > LARGE_RESPONSE_LIMIT_BYTES {
        report.warn(format!(
            "http.max_upstream_response_bytes is {}; whole responses are buffered in memory",
            cfg.http.max_upstream_response_bytes
        ));
    }

    if cfg.http.proxy_read_timeout_secs < cfg.http.proxy_connect_timeout_secs {
        report.warn("http.proxy_read_timeout_secs is shorter than proxy_connect_timeout_secs");
    }
}

fn validate_cache(cfg: &ProxyConfig, report: &mut ConfigReport) {
    let extension = cfg.cache.extension.as_str();
    if extension.contains('/') || extension.contains('\\') {
        report.error(format!(
            "cache.extension '{extension}' must not contain path separators"
        ));
    }

    match cfg.cache.backend {
        CacheBackend::Memory => {
            report.warn("cache.backend is 'memory'; cached bodies are lost on restart");
        }
        CacheBackend::Fs => {
            let dir = cfg.cache.dir.trim();
            if dir.is_empty() {
                report.error("cache.dir is empty but cache.backend is 'fs'");
                return;
            }

            let path = Path::new(dir);
            if path.exists() {
                if !path.is_dir() {
                    report.error(format!("cache.dir '{dir}' exists but is not a directory"));
                }
            } else {
                report.warn(format!(
                    "cache.dir '{dir}' does not exist; it will be created at startup"
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{CacheBackend, ProxyConfig};

    #[test]
    fn defaults_are_valid() {
        let report = ProxyConfig::default().validate();
        assert!(!report.has_errors(), "{report}");
    }

    #[test]
    fn empty_fs_dir_is_an_error() {
        let mut cfg = ProxyConfig::default();
        cfg.cache.dir = "  ".into();
        let report = cfg.validate();
        assert!(report.has_errors());
        assert!(report.errors()[0].contains("cache.dir"));
    }

    #[test]
    fn file_as_cache_dir_is_an_error() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut cfg = ProxyConfig::default();
        cfg.cache.dir = file.path().to_string_lossy().into_owned();
        assert!(cfg.validate().has_errors());
    }

    #[test]
    fn extension_with_separator_is_an_error() {
        let mut cfg = ProxyConfig::default();
        cfg.cache.extension = "../x".into();
        assert!(cfg.validate().has_errors());
    }

    #[test]
    fn memory_backend_only_warns() {
        let mut cfg = ProxyConfig::default();
        cfg.cache.backend = CacheBackend::Memory;
        cfg.cache.dir = String::new();
        let report = cfg.validate();
        assert!(!report.has_errors());
        assert_eq!(report.warnings().len(), 1);
        let rendered = report.to_string();
        assert!(rendered.starts_with("Warnings:\n"));
        assert!(rendered.contains("  - cache.backend is 'memory'"));
    }
}
