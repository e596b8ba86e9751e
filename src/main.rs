//! Edge reverse proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌────────────────────────────────────────────────────────┐
//!                      │                      EDGE PROXY                        │
//!                      │                                                        │
//!   Client Request     │  ┌──────────┐   ┌──────────────┐   ┌──────────┐        │
//!   ───────────────────┼─▶│ listener │──▶│  middleware  │──▶│ director │        │
//!                      │  │ (+TLS)   │   │    chain     │   │          │        │
//!                      │  └──────────┘   └──────────────┘   └────┬─────┘        │
//!                      │                  request id            │ round robin  │
//!                      │                  X-Forwarded-*         ▼              │
//!                      │                  X-Real-IP        ┌────────────┐      │
//!   Client Response    │                                   │ dispatcher │──────┼──▶ Backend
//!   ◀──────────────────┼───────────── relay / 502 ─────────│  (pooled)  │◀─────┼─── Server
//!                      │                                   └────────────┘      │
//!                      └────────────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tokio::net::TcpListener;

use edge_proxy::config::{load_config, validate_config, ConfigError, ProxyConfig};
use edge_proxy::http::HttpServer;
use edge_proxy::lifecycle::{signals, Shutdown};
use edge_proxy::net::tls::load_tls_config;
use edge_proxy::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "edge-proxy")]
#[command(about = "Round-robin edge reverse proxy", long_about = None)]
struct Args {
    /// TOML configuration file. Built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => {
            let config = ProxyConfig::default();
            validate_config(&config).map_err(ConfigError::Validation)?;
            config
        }
    };

    logging::init(&config.observability.log_level);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = ?args.config,
        "edge-proxy starting"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let tls = match &config.listener.tls {
        Some(tls) => {
            let addr: SocketAddr = tls.bind_address.parse()?;
            let rustls =
                load_tls_config(Path::new(&tls.cert_path), Path::new(&tls.key_path)).await?;
            Some((addr, rustls))
        }
        None => None,
    };

    let server = HttpServer::new(config)?;

    let listener = TcpListener::bind(&server.config().listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let plain_signal = shutdown.subscribe();
    let tls_signal = shutdown.subscribe();
    tokio::spawn(async move {
        signals::wait_for_signal().await;
        shutdown.trigger();
    });

    let plain = server.run(listener, plain_signal);
    let secure = async {
        match tls {
            Some((addr, rustls)) => server.run_tls(addr, rustls, tls_signal).await,
            None => Ok(()),
        }
    };
    tokio::try_join!(plain, secure)?;

    tracing::info!("Shutdown complete");
    Ok(())
}
