//! Three echo upstreams on 127.0.0.1:9000-9002, matching the default backend list.
//!
//! Each one answers any request with its name and the forwarding headers it received.

use axum::http::{HeaderMap, Uri};
use axum::Router;
use std::net::SocketAddr;

fn echo_app(name: String) -> Router {
    Router::new().fallback(move |uri: Uri, headers: HeaderMap| {
        let name = name.clone();
        async move {
            let get = |key: &str| {
                headers
                    .get(key)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("")
                    .to_string()
            };
            format!(
                "Upstream {name}\nXFF: {}\nXFP: {}\nReal IP: {}\nRequest ID: {}\nPath: {uri}\n",
                get("x-forwarded-for"),
                get("x-forwarded-proto"),
                get("x-real-ip"),
                get("x-request-id"),
            )
        }
    })
}

#[tokio::main]
async fn main() {
    let mut servers = Vec::new();
    for (i, port) in (9000..=9002).enumerate() {
        let addr = SocketAddr::from(([127, 0, 0, 1], port));
        let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
        println!("Upstream b{} is listening on http://{}", i + 1, addr);

        let app = echo_app(format!("b{}", i + 1));
        servers.push(tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        }));
    }

    for server in servers {
        let _ = server.await;
    }
}
