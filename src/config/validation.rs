//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Registry must be non-empty, every backend a valid `host:port`
//! - Trusted network must parse as a CIDR literal
//! - Bind addresses must parse as socket addresses
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::ProxyConfig;
use crate::load_balancer::{Backend, RegistryError};
use crate::security::{TrustedNetwork, TrustedNetworkError};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("at least one backend must be configured")]
    NoBackends,

    #[error("backend #{index}: {source}")]
    InvalidBackend {
        index: usize,
        source: RegistryError,
    },

    #[error("trusted network '{value}': {source}")]
    InvalidTrustedNetwork {
        value: String,
        source: TrustedNetworkError,
    },

    #[error("invalid bind address '{0}'")]
    InvalidBindAddress(String),

    #[error("invalid metrics address '{0}'")]
    InvalidMetricsAddress(String),
}

/// Check the whole configuration and collect every error found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.backends.is_empty() {
        errors.push(ValidationError::NoBackends);
    }
    for (index, backend) in config.backends.iter().enumerate() {
        if let Err(source) = Backend::parse(&backend.address) {
            errors.push(ValidationError::InvalidBackend { index, source });
        }
    }

    if let Err(source) = config.trust.trusted_network.parse::<TrustedNetwork>() {
        errors.push(ValidationError::InvalidTrustedNetwork {
            value: config.trust.trusted_network.clone(),
            source,
        });
    }

    check_socket_addr(
        &config.listener.bind_address,
        &mut errors,
        ValidationError::InvalidBindAddress,
    );
    if let Some(tls) = &config.listener.tls {
        check_socket_addr(&tls.bind_address, &mut errors, ValidationError::InvalidBindAddress);
    }
    if config.observability.metrics_enabled {
        check_socket_addr(
            &config.observability.metrics_address,
            &mut errors,
            ValidationError::InvalidMetricsAddress,
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_socket_addr(
    value: &str,
    errors: &mut Vec<ValidationError>,
    make: fn(String) -> ValidationError,
) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(make(value.to_string()));
    }
}
