//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single backend server by its `host:port` authority
//! - Hold the ordered, fixed-at-startup backend registry
//! - Refuse to build an empty registry

use axum::http::uri::Authority;
use std::fmt;
use std::num::NonZeroUsize;

use crate::config::BackendConfig;

/// Error building the backend registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("backend registry is empty")]
    Empty,

    #[error("invalid backend address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },
}

/// A single backend server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backend {
    /// The `host:port` the request is rewritten to.
    pub authority: Authority,
    /// Optional name for logging.
    pub name: Option<String>,
}

impl Backend {
    /// Parse a backend from its address.
    pub fn parse(address: &str) -> Result<Self, RegistryError> {
        let authority: Authority =
            address
                .parse()
                .map_err(|e: axum::http::uri::InvalidUri| RegistryError::InvalidAddress {
                    address: address.to_string(),
                    reason: e.to_string(),
                })?;

        // Userinfo would leak into the Host the backend sees.
        if authority.as_str().contains('@') {
            return Err(RegistryError::InvalidAddress {
                address: address.to_string(),
                reason: "userinfo is not allowed".to_string(),
            });
        }

        Ok(Self {
            authority,
            name: None,
        })
    }

    /// Get a display name for the backend (name or address).
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.authority.as_str())
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Ordered list of backends. Order is the round-robin cycle order.
#[derive(Debug, Clone)]
pub struct BackendRegistry {
    backends: Vec<Backend>,
}

impl BackendRegistry {
    /// Build a registry, rejecting an empty list.
    pub fn new(backends: Vec<Backend>) -> Result<Self, RegistryError> {
        if backends.is_empty() {
            return Err(RegistryError::Empty);
        }
        Ok(Self { backends })
    }

    /// Build a registry from configuration.
    pub fn from_config(configs: &[BackendConfig]) -> Result<Self, RegistryError> {
        let backends = configs
            .iter()
            .map(|config| {
                let mut backend = Backend::parse(&config.address)?;
                backend.name = config.name.clone();
                Ok(backend)
            })
            .collect::<Result<Vec<_>, RegistryError>>()?;

        Self::new(backends)
    }

    /// Number of backends; never zero.
    pub fn size(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.backends.len()).unwrap_or(NonZeroUsize::MIN)
    }

    /// Backend at `index`, wrapping around the registry.
    pub fn get(&self, index: usize) -> &Backend {
        &self.backends[index % self.backends.len()]
    }

    /// Backends in cycle order.
    pub fn iter(&self) -> impl Iterator<Item = &Backend> {
        self.backends.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_registry_rejected() {
        assert_eq!(BackendRegistry::new(Vec::new()).unwrap_err(), RegistryError::Empty);
        assert_eq!(BackendRegistry::from_config(&[]).unwrap_err(), RegistryError::Empty);
    }

    #[test]
    fn test_from_config_keeps_order_and_names() {
        let mut named = BackendConfig::new("app.internal:8000");
        named.name = Some("app".into());
        let registry =
            BackendRegistry::from_config(&[BackendConfig::new("127.0.0.1:9000"), named]).unwrap();

        assert_eq!(registry.size().get(), 2);
        assert_eq!(registry.get(0).authority.as_str(), "127.0.0.1:9000");
        assert_eq!(registry.get(1).display_name(), "app");
        assert_eq!(registry.get(2).authority.as_str(), "127.0.0.1:9000");

        let listed: Vec<_> = registry.iter().map(|b| b.to_string()).collect();
        assert_eq!(listed, ["127.0.0.1:9000", "app"]);
    }

    #[test]
    fn test_invalid_address() {
        assert!(matches!(
            Backend::parse("not a host"),
            Err(RegistryError::InvalidAddress { .. })
        ));
        assert!(matches!(
            Backend::parse("user@10.0.0.1:80"),
            Err(RegistryError::InvalidAddress { .. })
        ));
    }
}
