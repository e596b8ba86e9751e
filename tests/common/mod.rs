//! Shared utilities for integration tests.

#![allow(dead_code)]

use axum::http::{HeaderMap, Uri};
use axum::Router;
use std::net::SocketAddr;
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;

use edge_proxy::config::{BackendConfig, ProxyConfig};
use edge_proxy::lifecycle::Shutdown;
use edge_proxy::HttpServer;

/// Start a backend that reports its name and the forwarding headers it saw.
///
/// Response body, one field per line:
/// `Upstream <name>`, `XFF: ..`, `XFP: ..`, `Real IP: ..`, `Request ID: ..`, `Path: ..`
pub async fn start_echo_backend(name: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let app = Router::new().fallback(move |uri: Uri, headers: HeaderMap| async move {
        let get = |key: &str| {
            headers
                .get(key)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("")
                .to_string()
        };
        format!(
            "Upstream {name}\nXFF: {}\nXFP: {}\nReal IP: {}\nRequest ID: {}\nPath: {}\n",
            get("x-forwarded-for"),
            get("x-forwarded-proto"),
            get("x-real-ip"),
            get("x-request-id"),
            uri,
        )
    });

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// Start a backend that reads the request and hangs up without answering.
pub async fn start_hangup_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
            });
        }
    });
    addr
}

/// An address with nothing listening on it.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Default config pointed at `backends`, listening on an ephemeral port.
pub fn config_for(backends: &[SocketAddr]) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.backends = backends
        .iter()
        .map(|addr| BackendConfig::new(addr.to_string()))
        .collect();
    config
}

/// Run the proxy on an ephemeral port. Returns its address and the shutdown handle.
pub async fn start_proxy(config: ProxyConfig) -> (SocketAddr, Shutdown) {
    let server = HttpServer::new(config).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let signal = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, signal).await;
    });

    (addr, shutdown)
}

/// Value of a `Key: value` line in an echo backend body.
pub fn field<'a>(body: &'a str, key: &str) -> &'a str {
    body.lines()
        .find_map(|line| line.strip_prefix(key)?.strip_prefix(": "))
        .unwrap_or("")
}

/// Backend name from an echo backend body.
pub fn upstream(body: &str) -> &str {
    body.lines()
        .next()
        .and_then(|line| line.strip_prefix("Upstream "))
        .unwrap_or("")
}
