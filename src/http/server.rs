//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the request pipeline (middleware chain → director → dispatcher)
//! - Create the Axum Router that hands every request to the pipeline
//! - Serve plain HTTP, and optionally TLS, with graceful shutdown

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    response::Response,
    routing::any,
    Router,
};
use axum_server::tls_rustls::RustlsConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::{validate_config, ConfigError, ProxyConfig};
use crate::http::director::Director;
use crate::http::dispatch::{Dispatcher, Forwarder};
use crate::http::middleware::{
    Chain, ChainBuilder, ForwardedHeaders, Handler, RealIpHeader, RequestIdHeader,
};
use crate::http::request::RequestContext;
use crate::lifecycle::ShutdownSignal;
use crate::load_balancer::{BackendRegistry, RoundRobin, Selector};
use crate::security::TrustedNetwork;

/// How long the TLS listener waits for in-flight requests on shutdown.
const TLS_DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Chain<Forwarder>>,
    /// Whether this router sits behind the TLS listener.
    pub tls: bool,
}

/// HTTP server for the edge proxy.
pub struct HttpServer {
    config: ProxyConfig,
    pipeline: Arc<Chain<Forwarder>>,
}

impl HttpServer {
    /// Validate the configuration and build the request pipeline.
    pub fn new(config: ProxyConfig) -> Result<Self, ConfigError> {
        validate_config(&config).map_err(ConfigError::Validation)?;
        let pipeline = Arc::new(build_pipeline(&config)?);

        tracing::info!(
            steps = ?pipeline.names(),
            backends = config.backends.len(),
            trusted_network = %config.trust.trusted_network,
            "Request pipeline ready"
        );

        Ok(Self { config, pipeline })
    }

    /// Build the Axum router. `tls` marks requests as arriving over TLS.
    pub fn router(&self, tls: bool) -> Router {
        let state = AppState {
            pipeline: self.pipeline.clone(),
            tls,
        };

        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// Serve plain HTTP on `listener` until `shutdown` fires.
    pub async fn run(
        &self,
        listener: TcpListener,
        shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.router(false).into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown.recv())
            .await?;

        tracing::info!(address = %addr, "HTTP server stopped");
        Ok(())
    }

    /// Serve HTTPS on `addr` until `shutdown` fires.
    pub async fn run_tls(
        &self,
        addr: SocketAddr,
        tls_config: RustlsConfig,
        shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        tracing::info!(address = %addr, "HTTPS server starting");

        let handle = axum_server::Handle::new();
        let drain = handle.clone();
        tokio::spawn(async move {
            shutdown.recv().await;
            drain.graceful_shutdown(Some(TLS_DRAIN_TIMEOUT));
        });

        let app = self.router(true).into_make_service_with_connect_info::<SocketAddr>();
        axum_server::bind_rustls(addr, tls_config)
            .handle(handle)
            .serve(app)
            .await?;

        tracing::info!(address = %addr, "HTTPS server stopped");
        Ok(())
    }

    /// Names of the middleware steps, outermost first.
    pub fn steps(&self) -> Vec<&'static str> {
        self.pipeline.names()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

/// Assemble request-id → forwarded headers → real IP → director → dispatcher.
pub fn build_pipeline(config: &ProxyConfig) -> Result<Chain<Forwarder>, ConfigError> {
    let registry = Arc::new(BackendRegistry::from_config(&config.backends)?);
    let trust: TrustedNetwork = config.trust.trusted_network.parse()?;

    for (index, backend) in registry.iter().enumerate() {
        tracing::info!(
            index,
            backend = %backend,
            authority = %backend.authority,
            "Registered backend"
        );
    }

    let selector: Arc<dyn Selector> = Arc::new(RoundRobin::new(registry.size()));
    let director = Director::new(registry, selector);
    let dispatcher = Dispatcher::new(
        &config.transport,
        config.timeouts.upstream_secs.map(Duration::from_secs),
    );

    Ok(ChainBuilder::new()
        .step(RequestIdHeader)
        .step(ForwardedHeaders)
        .step(RealIpHeader::new(trust))
        .build(Forwarder::new(director, dispatcher)))
}

/// Every request, any method and path, goes through the pipeline.
async fn proxy_handler(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    let ctx = RequestContext::new(request, peer, state.tls);
    state.pipeline.handle(ctx).await
}
