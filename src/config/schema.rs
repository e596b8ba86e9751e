//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.
//! Defaults are the compiled-in constants used when no file is given.

use serde::{Deserialize, Serialize};

/// Root configuration for the edge proxy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// Ordered backend registry. Order is the round-robin cycle order.
    pub backends: Vec<BackendConfig>,

    /// Trust policy for client-supplied `X-Real-IP`.
    pub trust: TrustConfig,

    /// Upstream transport (connection pool) settings.
    pub transport: TransportConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            backends: (9000..9003)
                .map(|port| BackendConfig::new(format!("127.0.0.1:{port}")))
                .collect(),
            trust: TrustConfig::default(),
            transport: TransportConfig::default(),
            timeouts: TimeoutConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Optional TLS listener, served alongside the plain one.
    pub tls: Option<TlsConfig>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            tls: None,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Bind address of the TLS listener (e.g., "0.0.0.0:8443").
    pub bind_address: String,

    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// Backend server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Backend address (e.g., "127.0.0.1:3000").
    pub address: String,

    /// Optional name used in logs and metrics.
    #[serde(default)]
    pub name: Option<String>,
}

impl BackendConfig {
    /// Create an unnamed backend entry.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            name: None,
        }
    }
}

/// Trust policy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TrustConfig {
    /// The one peer network whose `X-Real-IP` claims are honored (CIDR literal).
    pub trusted_network: String,
}

impl Default for TrustConfig {
    fn default() -> Self {
        Self {
            trusted_network: "192.168.0.2/32".to_string(),
        }
    }
}

/// Upstream connection pool configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Maximum idle connections kept per backend. Extra connections are closed, not queued.
    pub max_idle_per_host: usize,

    /// How long an idle pooled connection is kept, in seconds.
    pub idle_timeout_secs: u64,

    /// Optional TCP connect timeout in seconds.
    pub connect_timeout_secs: Option<u64>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            max_idle_per_host: 10,
            idle_timeout_secs: 90,
            connect_timeout_secs: None,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Bound on the whole backend round-trip (until response headers), in seconds.
    /// Unset means the round-trip is unbounded.
    pub upstream_secs: Option<u64>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
