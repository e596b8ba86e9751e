//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML), or compiled-in defaults
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → handed to HttpServer at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    BackendConfig, ListenerConfig, ObservabilityConfig, ProxyConfig, TimeoutConfig, TlsConfig,
    TransportConfig, TrustConfig,
};
pub use validation::{validate_config, ValidationError};
