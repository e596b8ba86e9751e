//! Request target rewriting.
//!
//! Picks the next backend and points the request URI at it over plain HTTP/1.1.
//! Path and query are kept; the inbound `Host` header is left alone.
//! HTTP/2 clients send no `Host`, so their `:authority` is carried over as one.

use axum::http::uri::{PathAndQuery, Scheme};
use axum::http::{header, Uri, Version};
use std::sync::Arc;

use crate::http::request::RequestContext;
use crate::load_balancer::{BackendRegistry, Selector};

#[derive(Debug, Clone)]
pub struct Director {
    registry: Arc<BackendRegistry>,
    selector: Arc<dyn Selector>,
}

impl Director {
    pub fn new(registry: Arc<BackendRegistry>, selector: Arc<dyn Selector>) -> Self {
        Self { registry, selector }
    }

    /// Rewrite the request target to the next backend.
    pub fn direct(&self, ctx: &mut RequestContext) {
        let backend = self.registry.get(self.selector.next());

        if !ctx.headers().contains_key(header::HOST) {
            if let Some(authority) = ctx.uri().authority().map(|a| a.to_string()) {
                ctx.set_header(header::HOST, &authority);
            }
        }
        // The upstream pool speaks HTTP/1 only, whatever the client used.
        *ctx.version_mut() = Version::HTTP_11;

        let mut parts = ctx.uri().clone().into_parts();
        parts.scheme = Some(Scheme::HTTP);
        parts.authority = Some(backend.authority.clone());
        if parts.path_and_query.is_none() {
            parts.path_and_query = Some(PathAndQuery::from_static("/"));
        }

        match Uri::from_parts(parts) {
            Ok(uri) => *ctx.uri_mut() = uri,
            Err(e) => tracing::warn!(
                request_id = %ctx.request_id(),
                backend = %backend,
                error = %e,
                "Failed to rewrite request URI"
            ),
        }

        tracing::debug!(
            request_id = %ctx.request_id(),
            backend = %backend,
            "Directed request"
        );
    }
}
