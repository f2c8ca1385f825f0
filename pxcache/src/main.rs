use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use anyhow::Context;
use clap::Parser;
use pxcache_cache::{CacheStore, FsCacheStore, MemoryCacheStore};
use pxcache_config::{CacheBackend, ProxyConfig};
use pxcache_core::{Master, ProxyHandler};
use pxcache_proxy::TcpOriginClient;
use tracing::info;
use utils::init_tracing;

#[derive(Parser, Debug)]
#[command(name = "pxcache")]
#[command(about = "Forward HTTP/1.0 proxy with a response cache", long_about = None)]
struct Cli {
    /// Port to listen on (1024-65535)
    #[arg(value_parser = clap::value_parser!(u16).range(1024..=65535))]
    port: u16,

    /// Path to the configuration file
    #[arg(short, long, default_value = "pxcache.conf")]
    config: String,

    /// Address to bind
    #[arg(short, long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    bind: IpAddr,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cfg = ProxyConfig::from_file_or_default(&cli.config);
    init_tracing(cfg.global.log_level());
    cfg.print();

    let listen = SocketAddr::new(cli.bind, cli.port);
    let origin = TcpOriginClient::from_config(&cfg.http);

    match cfg.cache.backend() {
        CacheBackend::Fs => {
            let store = FsCacheStore::new(cfg.cache.dir(), cfg.cache.extension());
            store
                .init()
                .await
                .with_context(|| format!("creating cache directory '{}'", cfg.cache.dir()))?;
            info!(
                target: "pxcache::master",
                dir = %store.dir().display(),
                "Using file-system cache"
            );
            serve(cfg, listen, store, origin).await
        }
        CacheBackend::Memory => {
            info!(target: "pxcache::master", "Using in-memory cache");
            serve(cfg, listen, MemoryCacheStore::new(), origin).await
        }
    }
}

async fn serve<S: CacheStore>(
    cfg: ProxyConfig,
    listen: SocketAddr,
    store: S,
    origin: TcpOriginClient,
) -> anyhow::Result<()> {
    let master = Master::new(cfg, listen, ProxyHandler::new(store, origin));
    master.run().await
}
