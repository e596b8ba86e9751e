//! Edge reverse proxy library.
//!
//! Round-robin load balancing over a fixed backend list, with trust-aware
//! `X-Forwarded-For`, `X-Forwarded-Proto` and `X-Real-IP` headers.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod load_balancer;
pub mod net;
pub mod observability;
pub mod security;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
