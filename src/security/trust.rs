//! Trusted network (CIDR) matching.
//!
//! A single network literal decides which peers may assert a client's real IP.
//! Accepts `addr/prefix` or a bare address (host route).

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// Error returned when a trusted-network literal cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrustedNetworkError {
    #[error("invalid network address '{0}'")]
    Address(String),

    #[error("invalid prefix length '{0}'")]
    Prefix(String),

    #[error("prefix length {len} exceeds {max}")]
    PrefixTooLong { len: u8, max: u8 },
}

/// An IPv4 or IPv6 network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrustedNetwork {
    network: IpAddr,
    prefix_len: u8,
}

impl TrustedNetwork {
    /// Build a network from an address and prefix length. Host bits are cleared.
    pub fn new(addr: IpAddr, prefix_len: u8) -> Result<Self, TrustedNetworkError> {
        let max = max_prefix(addr);
        if prefix_len > max {
            return Err(TrustedNetworkError::PrefixTooLong { len: prefix_len, max });
        }

        let network = match addr {
            IpAddr::V4(v4) => IpAddr::V4(Ipv4Addr::from(u32::from(v4) & mask_v4(prefix_len))),
            IpAddr::V6(v6) => IpAddr::V6(Ipv6Addr::from(u128::from(v6) & mask_v6(prefix_len))),
        };

        Ok(Self { network, prefix_len })
    }

    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    /// Return true if `ip` falls inside this network.
    ///
    /// IPv4-mapped IPv6 addresses are compared as IPv4. Addresses of the other
    /// family never match.
    pub fn contains(&self, ip: IpAddr) -> bool {
        match (self.network, ip.to_canonical()) {
            (IpAddr::V4(net), IpAddr::V4(ip)) => {
                let mask = mask_v4(self.prefix_len);
                u32::from(ip) & mask == u32::from(net)
            }
            (IpAddr::V6(net), IpAddr::V6(ip)) => {
                let mask = mask_v6(self.prefix_len);
                u128::from(ip) & mask == u128::from(net)
            }
            _ => false,
        }
    }
}

impl FromStr for TrustedNetwork {
    type Err = TrustedNetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (addr_str, prefix_str) = match s.split_once('/') {
            Some((addr, prefix)) => (addr, Some(prefix)),
            None => (s, None),
        };

        let addr: IpAddr = addr_str
            .parse()
            .map_err(|_| TrustedNetworkError::Address(addr_str.to_string()))?;

        let prefix_len = match prefix_str {
            Some(p) => p
                .parse::<u8>()
                .map_err(|_| TrustedNetworkError::Prefix(p.to_string()))?,
            None => max_prefix(addr),
        };

        Self::new(addr, prefix_len)
    }
}

impl fmt::Display for TrustedNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix_len)
    }
}

fn max_prefix(addr: IpAddr) -> u8 {
    match addr {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    }
}

fn mask_v4(prefix_len: u8) -> u32 {
    if prefix_len == 0 {
        0
    } else {
        u32::MAX << (32 - u32::from(prefix_len))
    }
}

fn mask_v6(prefix_len: u8) -> u128 {
    if prefix_len == 0 {
        0
    } else {
        u128::MAX << (128 - u32::from(prefix_len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_host_route() {
        let net: TrustedNetwork = "192.168.0.2/32".parse().unwrap();
        assert!(net.contains(ip("192.168.0.2")));
        assert!(!net.contains(ip("192.168.0.3")));
    }

    #[test]
    fn test_bare_address_is_host_route() {
        let net: TrustedNetwork = "10.0.0.1".parse().unwrap();
        assert_eq!(net.prefix_len(), 32);
        assert!(net.contains(ip("10.0.0.1")));
        assert!(!net.contains(ip("10.0.0.2")));
    }

    #[test]
    fn test_range_clears_host_bits() {
        let net: TrustedNetwork = "10.1.2.3/8".parse().unwrap();
        assert_eq!(net.to_string(), "10.0.0.0/8");
        assert!(net.contains(ip("10.255.0.1")));
        assert!(!net.contains(ip("11.0.0.1")));
    }

    #[test]
    fn test_zero_prefix_matches_family() {
        let net: TrustedNetwork = "0.0.0.0/0".parse().unwrap();
        assert!(net.contains(ip("203.0.113.9")));
        assert!(!net.contains(ip("2001:db8::1")));
    }

    #[test]
    fn test_ipv6() {
        let net: TrustedNetwork = "2001:db8::/32".parse().unwrap();
        assert!(net.contains(ip("2001:db8:ffff::1")));
        assert!(!net.contains(ip("2001:db9::1")));
        assert!(!net.contains(ip("10.0.0.1")));
    }

    #[test]
    fn test_ipv4_mapped_peer() {
        let net: TrustedNetwork = "192.168.0.0/24".parse().unwrap();
        assert!(net.contains(ip("::ffff:192.168.0.7")));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            "nope/24".parse::<TrustedNetwork>(),
            Err(TrustedNetworkError::Address("nope".into()))
        );
        assert_eq!(
            "10.0.0.0/x".parse::<TrustedNetwork>(),
            Err(TrustedNetworkError::Prefix("x".into()))
        );
        assert_eq!(
            "10.0.0.0/33".parse::<TrustedNetwork>(),
            Err(TrustedNetworkError::PrefixTooLong { len: 33, max: 32 })
        );
    }
}
