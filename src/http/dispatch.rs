//! Upstream dispatch over a pooled client.
//!
//! # Responsibilities
//! - Own the pooled HTTP client (bounded idle connections per backend)
//! - Strip hop-by-hop headers before sending
//! - Relay the backend response, or answer 502 on any transport failure
//!
//! # Design Decisions
//! - One attempt per request: no retry, no fallback backend
//! - Idle pool overflow closes connections instead of blocking callers
//! - Round-trip is unbounded unless `timeouts.upstream_secs` is set

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderName, Request};
use axum::response::Response;
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::time::{Duration, Instant};

use crate::config::TransportConfig;
use crate::http::director::Director;
use crate::http::middleware::Handler;
use crate::http::request::RequestContext;
use crate::http::response::{bad_gateway, relay};
use crate::observability::metrics;

/// Client type shared by every request.
pub type HttpClient = Client<HttpConnector, Body>;

/// Why a backend round-trip failed.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("upstream request failed: {0}")]
    Transport(#[from] hyper_util::client::legacy::Error),

    #[error("upstream did not respond within {0:?}")]
    Timeout(Duration),
}

/// Headers that describe one connection and must not be forwarded.
const HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    HeaderName::from_static("proxy-connection"),
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Sends rewritten requests upstream.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    client: HttpClient,
    upstream_timeout: Option<Duration>,
}

impl Dispatcher {
    pub fn new(transport: &TransportConfig, upstream_timeout: Option<Duration>) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_nodelay(true);
        connector.set_connect_timeout(transport.connect_timeout_secs.map(Duration::from_secs));

        let client = Client::builder(TokioExecutor::new())
            .pool_max_idle_per_host(transport.max_idle_per_host)
            .pool_idle_timeout(Duration::from_secs(transport.idle_timeout_secs))
            .build(connector);

        Self {
            client,
            upstream_timeout,
        }
    }

    /// Send one request and wait for the response head.
    pub async fn round_trip(
        &self,
        mut request: Request<Body>,
    ) -> Result<hyper::Response<Incoming>, DispatchError> {
        strip_hop_by_hop(request.headers_mut());

        let pending = self.client.request(request);
        let response = match self.upstream_timeout {
            Some(limit) => tokio::time::timeout(limit, pending)
                .await
                .map_err(|_| DispatchError::Timeout(limit))??,
            None => pending.await?,
        };
        Ok(response)
    }

    /// Forward the request and build the client response.
    pub async fn dispatch(&self, ctx: RequestContext) -> Response {
        let start_time = Instant::now();
        let request_id = ctx.request_id().to_string();
        let method = ctx.method().to_string();
        let backend = ctx
            .uri()
            .authority()
            .map(|a| a.to_string())
            .unwrap_or_default();

        match self.round_trip(ctx.into_request()).await {
            Ok(response) => {
                let status = response.status();
                tracing::debug!(
                    request_id = %request_id,
                    backend = %backend,
                    status = status.as_u16(),
                    "Upstream responded"
                );
                metrics::record_request(&method, status.as_u16(), &backend, start_time);
                relay(response)
            }
            Err(e) => {
                tracing::error!(
                    request_id = %request_id,
                    backend = %backend,
                    error = %e,
                    "Upstream error"
                );
                metrics::record_upstream_error(&backend);
                metrics::record_request(&method, 502, &backend, start_time);
                bad_gateway()
            }
        }
    }
}

/// Remove hop-by-hop headers, including any named by `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in listed.iter().chain(HOP_BY_HOP.iter()) {
        headers.remove(name);
    }
}

/// Terminal stage: direct, then dispatch.
#[derive(Debug, Clone)]
pub struct Forwarder {
    director: Director,
    dispatcher: Dispatcher,
}

impl Forwarder {
    pub fn new(director: Director, dispatcher: Dispatcher) -> Self {
        Self {
            director,
            dispatcher,
        }
    }
}

impl Handler for Forwarder {
    async fn handle(&self, mut ctx: RequestContext) -> Response {
        self.director.direct(&mut ctx);
        self.dispatcher.dispatch(ctx).await
    }
}
