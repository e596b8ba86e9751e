//! Forwarding metadata steps.

use crate::http::middleware::RequestStep;
use crate::http::request::RequestContext;
use crate::security::headers::{
    forwarded_proto, real_ip, remote_host, X_FORWARDED_FOR, X_FORWARDED_PROTO, X_REAL_IP,
};
use crate::security::TrustedNetwork;

/// Sets `X-Forwarded-Proto` and `X-Forwarded-For`, discarding client values.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForwardedHeaders;

impl RequestStep for ForwardedHeaders {
    fn name(&self) -> &'static str {
        "forwarded-headers"
    }

    fn apply(&self, ctx: &mut RequestContext) {
        let proto = forwarded_proto(ctx.is_tls());
        let host = remote_host(ctx.peer());
        ctx.set_header(X_FORWARDED_PROTO, proto);
        ctx.set_header(X_FORWARDED_FOR, &host);
    }
}

/// Sets `X-Real-IP`, honoring a client claim only from the trusted network.
#[derive(Debug, Clone, Copy)]
pub struct RealIpHeader {
    trust: TrustedNetwork,
}

impl RealIpHeader {
    pub fn new(trust: TrustedNetwork) -> Self {
        Self { trust }
    }
}

impl RequestStep for RealIpHeader {
    fn name(&self) -> &'static str {
        "real-ip"
    }

    fn apply(&self, ctx: &mut RequestContext) {
        let ip = real_ip(ctx.headers(), ctx.peer(), &self.trust);
        ctx.set_header(X_REAL_IP, &ip);
    }
}
