//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, peer address, TLS flag)
//!     → request.rs (RequestContext owns the request)
//!     → middleware/ (request id, X-Forwarded-*, X-Real-IP)
//!     → director.rs (round-robin backend, URI rewrite)
//!     → dispatch.rs (pooled client round-trip)
//!     → response.rs (relay as-is, or 502)
//!     → Send to client
//! ```

pub mod director;
pub mod dispatch;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use director::Director;
pub use dispatch::{DispatchError, Dispatcher, Forwarder};
pub use request::{RequestContext, X_REQUEST_ID};
pub use server::{build_pipeline, HttpServer};
