//! Per-request context.
//!
//! # Responsibilities
//! - Own the inbound request while it moves through the proxy
//! - Carry the peer address and the TLS flag of the accepting listener
//! - Give the middleware chain and the director mutable access
//!
//! # Design Decisions
//! - One owner per request; stages borrow it mutably, one at a time
//! - The context is consumed when the dispatcher sends the request

use axum::body::Body;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, Request, Uri, Version};
use std::net::SocketAddr;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Mutable view of one in-flight request.
#[derive(Debug)]
pub struct RequestContext {
    request: Request<Body>,
    peer: SocketAddr,
    tls: bool,
}

impl RequestContext {
    pub fn new(request: Request<Body>, peer: SocketAddr, tls: bool) -> Self {
        Self { request, peer, tls }
    }

    /// Remote address of the connection the request arrived on.
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// True when the client-facing connection used TLS.
    pub fn is_tls(&self) -> bool {
        self.tls
    }

    pub fn method(&self) -> &Method {
        self.request.method()
    }

    pub fn uri(&self) -> &Uri {
        self.request.uri()
    }

    pub fn uri_mut(&mut self) -> &mut Uri {
        self.request.uri_mut()
    }

    pub fn version_mut(&mut self) -> &mut Version {
        self.request.version_mut()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.request.headers()
    }

    /// Replace every value of `name` with `value`.
    ///
    /// Values that are not valid header text are dropped with a warning.
    pub fn set_header(&mut self, name: HeaderName, value: &str) {
        match HeaderValue::from_str(value) {
            Ok(value) => {
                self.request.headers_mut().insert(name, value);
            }
            Err(_) => {
                tracing::warn!(header = %name, "Dropping header with invalid value");
                self.request.headers_mut().remove(name);
            }
        }
    }

    /// The request id, if one has been assigned.
    pub fn request_id(&self) -> &str {
        self.request
            .headers()
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
    }

    pub fn into_request(self) -> Request<Body> {
        self.request
    }
}
