//! Request ID assignment.
//!
//! Keeps an incoming `X-Request-Id` and otherwise generates a UUID v4, so the
//! same id shows up in proxy logs and at the backend.

use uuid::Uuid;

use crate::http::middleware::RequestStep;
use crate::http::request::{RequestContext, X_REQUEST_ID};

#[derive(Debug, Clone, Copy, Default)]
pub struct RequestIdHeader;

impl RequestStep for RequestIdHeader {
    fn name(&self) -> &'static str {
        "request-id"
    }

    fn apply(&self, ctx: &mut RequestContext) {
        if ctx.headers().contains_key(X_REQUEST_ID) {
            return;
        }
        let id = Uuid::new_v4().to_string();
        ctx.set_header(X_REQUEST_ID, &id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;

    #[test]
    fn test_generates_when_missing() {
        let peer = "127.0.0.1:1".parse().unwrap();
        let mut ctx = RequestContext::new(Request::new(Body::empty()), peer, false);
        RequestIdHeader.apply(&mut ctx);
        assert!(Uuid::parse_str(ctx.request_id()).is_ok());
    }

    #[test]
    fn test_keeps_existing() {
        let request = Request::builder()
            .header("x-request-id", "abc-123")
            .body(Body::empty())
            .unwrap();
        let mut ctx = RequestContext::new(request, "127.0.0.1:1".parse().unwrap(), false);
        RequestIdHeader.apply(&mut ctx);
        assert_eq!(ctx.request_id(), "abc-123");
    }
}
