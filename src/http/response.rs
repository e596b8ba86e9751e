//! Response handling and transformation.
//!
//! # Responsibilities
//! - Relay the backend response to the client as-is (status, headers, body)
//! - Map every upstream failure to one fixed 502 response
//!
//! # Design Decisions
//! - Streaming responses avoid buffering entire body
//! - The client never sees why the upstream failed; the log does

use axum::body::Body;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use hyper::body::Incoming;

pub const BAD_GATEWAY_BODY: &str = "Bad Gateway";

/// The single failure response the proxy emits.
pub fn bad_gateway() -> Response {
    (StatusCode::BAD_GATEWAY, BAD_GATEWAY_BODY).into_response()
}

/// Hand a backend response to the client without touching status, headers or body.
pub fn relay(response: hyper::Response<Incoming>) -> Response {
    let (parts, body) = response.into_parts();
    Response::from_parts(parts, Body::new(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;

    #[tokio::test]
    async fn test_bad_gateway_shape() {
        let response = bad_gateway();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], BAD_GATEWAY_BODY.as_bytes());
    }
}
