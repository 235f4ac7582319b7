//! Middleware chain.
//!
//! # Data Flow
//! ```text
//! dispatcher
//!     → middleware[0] (pre)
//!         → middleware[1] (pre)
//!             → route handler sequence
//!         ← middleware[1] (post)
//!     ← middleware[0] (post)
//! ```
//!
//! # Design Decisions
//! - Registration order is execution order, outermost first
//! - `Next` is consumed by `run`, so a middleware cannot continue twice
//! - Dropping `Next` without running it short-circuits the chain

use futures_util::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;

use crate::http::handler::HandlerSequence;
use crate::http::request::Request;
use crate::http::response::ResponseWriter;

/// A request interceptor wrapping everything registered after it.
pub trait Middleware: Send + Sync + 'static {
    fn handle(&self, w: ResponseWriter, req: Request, next: Next) -> BoxFuture<'static, ()>;
}

impl<F, Fut> Middleware for F
where
    F: Fn(ResponseWriter, Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    fn handle(&self, w: ResponseWriter, req: Request, next: Next) -> BoxFuture<'static, ()> {
        Box::pin(self(w, req, next))
    }
}

pub type BoxedMiddleware = Arc<dyn Middleware>;

/// Ordered list of middleware, shared read-only once serving starts.
#[derive(Clone)]
pub struct MiddlewareChain {
    stack: Arc<[BoxedMiddleware]>,
}

impl Default for MiddlewareChain {
    fn default() -> Self {
        Self {
            stack: Arc::new([]),
        }
    }
}

impl MiddlewareChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a middleware. Rebuilds the stack, so `start` stays a pointer copy.
    pub fn push<M: Middleware>(&mut self, middleware: M) {
        let mut stack = self.stack.to_vec();
        stack.push(Arc::new(middleware));
        self.stack = stack.into();
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// The continuation that starts the chain for one request.
    pub(crate) fn start(&self, handlers: HandlerSequence) -> Next {
        Next {
            stack: Arc::clone(&self.stack),
            index: 0,
            handlers,
        }
    }
}

impl std::fmt::Debug for MiddlewareChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiddlewareChain")
            .field("len", &self.stack.len())
            .finish()
    }
}

/// The rest of the chain after the current middleware.
pub struct Next {
    stack: Arc<[BoxedMiddleware]>,
    index: usize,
    handlers: HandlerSequence,
}

impl Next {
    /// Continue with the next middleware, or the route's handlers when none
    /// are left.
    pub async fn run(self, w: ResponseWriter, req: Request) {
        match self.stack.get(self.index).cloned() {
            Some(middleware) => {
                tracing::trace!(middleware = self.index, "Entering middleware");
                let next = Next {
                    stack: self.stack,
                    index: self.index + 1,
                    handlers: self.handlers,
                };
                middleware.handle(w, req, next).await;
            }
            None => self.handlers.run(w, req).await,
        }
    }
}
