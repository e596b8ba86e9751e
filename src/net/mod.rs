//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → plain listener (tokio TcpListener, served by axum)
//!     → or tls.rs (rustls handshake, served by axum-server)
//!     → Hand off to HTTP layer with the TLS flag of that listener
//! ```
//!
//! # Design Decisions
//! - TLS termination is delegated to rustls
//! - The scheme a client used is a property of the listener, not the request

pub mod tls;
