use serde::Deserialize;

use crate::validation::{validate, ConfigReport};
use crate::{CacheConfig, GlobalConfig, HttpConfig};

// =======================================================
// PROXY CONFIG — main config
// =======================================================
#[derive(Debug, Deserialize)]
pub struct ProxyConfig {
    #[serde(default)]
    pub global: GlobalConfig,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub cache: CacheConfig,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        let mut cfg = Self {
            global: GlobalConfig::default(),
            http: HttpConfig::default(),
            cache: CacheConfig::default(),
        };
        cfg.apply_defaults();
        cfg
    }
}

impl ProxyConfig {
    /// Validate the configuration and return a report of warnings and errors.
    pub fn validate(&self) -> ConfigReport {
        validate(self)
    }

    pub fn from_file(file_name: &str) -> Result<Self, config::ConfigError> {
        let built = config::Config::builder()
            .add_source(config::File::new(file_name, config::FileFormat::Ini).required(false))
            .build()?;

        let mut cfg: ProxyConfig = built.try_deserialize()?;

        cfg.apply_defaults();
        Ok(cfg)
    }

    pub fn from_file_or_default(file_name: &str) -> Self {
        match Self::from_file(file_name) {
            Ok(cfg) => {
                let report = cfg.validate();
                if report.has_errors() {
                    eprintln!(
                        "Invalid config in '{file_name}' ({} errors):",
                        report.errors().len()
                    );
                    eprint!("{report}");
                    eprintln!("Using built-in defaults");
                    ProxyConfig::default()
                } else {
                    if !report.warnings().is_empty() {
                        eprintln!("Config warnings in '{file_name}':");
                        eprint!("{report}");
                    }
                    cfg
                }
            }
            Err(e) => {
                eprintln!("Error reading config '{file_name}': {e}");
                eprintln!("Using built-in defaults");
                ProxyConfig::default()
            }
        }
    }

    fn apply_defaults(&mut self) {
        let def_global = GlobalConfig::default();
        self.global.apply_defaults_from(&def_global);

        let def_http = HttpConfig::default();
        self.http.apply_defaults_from(&def_http);
    }

    pub fn print(&self) {
        println!("=============== PXCACHE CONFIG ===============");
        println!("\n[global]");
        println!("  worker_connections   = {}", self.global.worker_connections);
        println!("  log_level            = {}", self.global.log_level);

        println!("\n[http]");
        println!(
            "  client_read_timeout_secs    = {}",
            self.http.client_read_timeout_secs
        );
        println!(
            "  proxy_connect_timeout_secs  = {}",
            self.http.proxy_connect_timeout_secs
        );
        println!(
            "  proxy_read_timeout_secs     = {}",
            self.http.proxy_read_timeout_secs
        );
        println!(
            "  proxy_write_timeout_secs    = {}",
            self.http.proxy_write_timeout_secs
        );
        println!("  max_request_bytes           = {}", self.http.max_request_bytes);
        println!(
            "  max_upstream_response_bytes = {}",
            self.http.max_upstream_response_bytes
        );

        println!("\n[cache]");
        println!("  backend   = {:?}", self.cache.backend);
        println!("  dir       = {}", self.cache.dir);
        println!("  extension = {}", self.cache.extension);
        println!("==============================================");
    }
}
