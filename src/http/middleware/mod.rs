//! Request-mutation middleware chain.
//!
//! # Data Flow
//! ```text
//! RequestContext
//!     → step 1 (outermost, declared first)
//!     → step 2
//!     → ...
//!     → terminal Handler (director + dispatcher)
//! ```
//!
//! # Design Decisions
//! - The chain is an explicit list folded once at startup by `ChainBuilder`
//! - Steps only mutate; none can reject or short-circuit
//! - A built `Chain` is itself a `Handler`, so chains nest

pub mod forwarded;
pub mod request_id;

use axum::response::Response;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::http::request::RequestContext;

pub use forwarded::{ForwardedHeaders, RealIpHeader};
pub use request_id::RequestIdHeader;

/// A single request-mutating step.
pub trait RequestStep: Send + Sync + fmt::Debug {
    /// Short name, used to inspect chain order.
    fn name(&self) -> &'static str;

    fn apply(&self, ctx: &mut RequestContext);
}

/// Terminal stage that turns a request into a response.
pub trait Handler: Send + Sync {
    fn handle(&self, ctx: RequestContext) -> impl Future<Output = Response> + Send;
}

/// Collects steps in declaration order.
#[derive(Debug, Clone, Default)]
pub struct ChainBuilder {
    steps: Vec<Arc<dyn RequestStep>>,
}

impl ChainBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step. Earlier steps run first.
    pub fn step(mut self, step: impl RequestStep + 'static) -> Self {
        self.steps.push(Arc::new(step));
        self
    }

    /// Append every step of `other`, keeping its order.
    pub fn then(mut self, other: ChainBuilder) -> Self {
        self.steps.extend(other.steps);
        self
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Fold the steps in front of `terminal`.
    pub fn build<H: Handler>(self, terminal: H) -> Chain<H> {
        Chain {
            steps: self.steps.into(),
            terminal,
        }
    }
}

/// Steps composed in front of a terminal handler.
pub struct Chain<H> {
    steps: Arc<[Arc<dyn RequestStep>]>,
    terminal: H,
}

impl<H> Chain<H> {
    pub fn names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Run every step, in order, on `ctx`.
    pub fn apply(&self, ctx: &mut RequestContext) {
        for step in self.steps.iter() {
            step.apply(ctx);
        }
    }
}

impl<H: fmt::Debug> fmt::Debug for Chain<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain")
            .field("steps", &self.names())
            .field("terminal", &self.terminal)
            .finish()
    }
}

impl<H: Handler> Handler for Chain<H> {
    async fn handle(&self, mut ctx: RequestContext) -> Response {
        self.apply(&mut ctx);
        self.terminal.handle(ctx).await
    }
}
