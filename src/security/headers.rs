//! Forwarded metadata resolution.
//!
//! # Responsibilities
//! - Compute X-Forwarded-Proto from the client-facing connection
//! - Compute X-Forwarded-For from the peer address (single hop, overwrites)
//! - Resolve X-Real-IP against the trusted network
//!
//! # Design Decisions
//! - Only a peer inside the trusted network may assert X-Real-IP
//! - Anything unreadable is untrusted; resolution never fails a request
//! - X-Forwarded-For is replaced, not appended to

use axum::http::{HeaderMap, HeaderName};
use std::net::SocketAddr;

use crate::security::trust::TrustedNetwork;

pub const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");
pub const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");
pub const X_REAL_IP: HeaderName = HeaderName::from_static("x-real-ip");

/// Scheme of the client-facing connection.
pub fn forwarded_proto(tls: bool) -> &'static str {
    if tls {
        "https"
    } else {
        "http"
    }
}

/// Peer host without the port. IPv4-mapped IPv6 peers are shown as IPv4.
pub fn remote_host(peer: SocketAddr) -> String {
    peer.ip().to_canonical().to_string()
}

/// Resolve the client's real IP.
///
/// A client-supplied `X-Real-IP` is returned verbatim only when the peer sits
/// inside `trust`. In every other case the peer's own address wins.
pub fn real_ip(headers: &HeaderMap, peer: SocketAddr, trust: &TrustedNetwork) -> String {
    let remote = remote_host(peer);

    let claimed = match headers.get(X_REAL_IP) {
        None => return remote,
        Some(value) => match value.to_str() {
            Ok(v) if v.is_empty() => return remote,
            Ok(v) => v,
            Err(_) => {
                tracing::debug!(peer = %peer, "Unreadable X-Real-IP treated as untrusted");
                return remote;
            }
        },
    };

    if trust.contains(peer.ip()) {
        claimed.to_string()
    } else {
        tracing::trace!(peer = %peer, claimed, "Discarding X-Real-IP from untrusted peer");
        remote
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn trust() -> TrustedNetwork {
        "192.168.0.2/32".parse().unwrap()
    }

    fn with_real_ip(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(X_REAL_IP, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_proto() {
        assert_eq!(forwarded_proto(true), "https");
        assert_eq!(forwarded_proto(false), "http");
    }

    #[test]
    fn test_remote_host_strips_port() {
        assert_eq!(remote_host("10.0.0.5:51234".parse().unwrap()), "10.0.0.5");
        assert_eq!(remote_host("[2001:db8::1]:443".parse().unwrap()), "2001:db8::1");
        assert_eq!(remote_host("[::ffff:10.0.0.5]:80".parse().unwrap()), "10.0.0.5");
    }

    #[test]
    fn test_trusted_peer_claim_is_kept() {
        let peer = "192.168.0.2:40000".parse().unwrap();
        assert_eq!(real_ip(&with_real_ip("1.2.3.4"), peer, &trust()), "1.2.3.4");
    }

    #[test]
    fn test_untrusted_peer_claim_is_discarded() {
        let peer = "10.0.0.5:40000".parse().unwrap();
        assert_eq!(real_ip(&with_real_ip("1.2.3.4"), peer, &trust()), "10.0.0.5");
    }

    #[test]
    fn test_no_claim_returns_peer() {
        let headers = HeaderMap::new();
        let trusted = "192.168.0.2:40000".parse().unwrap();
        let untrusted = "10.0.0.5:40000".parse().unwrap();
        assert_eq!(real_ip(&headers, trusted, &trust()), "192.168.0.2");
        assert_eq!(real_ip(&headers, untrusted, &trust()), "10.0.0.5");
    }

    #[test]
    fn test_empty_claim_returns_peer() {
        let peer = "192.168.0.2:40000".parse().unwrap();
        assert_eq!(real_ip(&with_real_ip(""), peer, &trust()), "192.168.0.2");
    }

    #[test]
    fn test_unreadable_claim_returns_peer() {
        let mut headers = HeaderMap::new();
        headers.insert(X_REAL_IP, HeaderValue::from_bytes(b"\xfe\xff").unwrap());
        let peer = "192.168.0.2:40000".parse().unwrap();
        assert_eq!(real_ip(&headers, peer, &trust()), "192.168.0.2");
    }
}
