//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Director asks for a backend
//!     → Selector::next() (round_robin.rs draws the next index)
//!     → BackendRegistry::get(index) (backend.rs)
//!     → authority written into the request URI
//! ```
//!
//! # Design Decisions
//! - The registry is fixed at startup and never empty
//! - The selector's counter is the only shared mutable state on the request path
//! - No health awareness: every backend stays in rotation

pub mod backend;
pub mod round_robin;

pub use backend::{Backend, BackendRegistry, RegistryError};
pub use round_robin::RoundRobin;

/// Picks the index of the next backend.
///
/// Implementations must be callable concurrently without caller-side locking.
pub trait Selector: Send + Sync + std::fmt::Debug {
    fn next(&self) -> usize;
}
