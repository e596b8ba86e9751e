//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → trust.rs (is the peer inside the trusted network?)
//!     → headers.rs (derive X-Forwarded-*, X-Real-IP)
//!     → http::middleware writes them onto the request
//! ```
//!
//! # Design Decisions
//! - No trust in client input unless the peer is trusted
//! - Degrade to the observed peer address, never reject

pub mod headers;
pub mod trust;

pub use trust::{TrustedNetwork, TrustedNetworkError};
