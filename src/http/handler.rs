//! Route handlers.

use futures_util::future::BoxFuture;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::http::request::Request;
use crate::http::response::ResponseWriter;

/// Application code invoked for a matched route.
///
/// Handlers produce the response through the [`ResponseWriter`]; they do not
/// return one. Any `async fn(ResponseWriter, Request)` is a handler.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, w: ResponseWriter, req: Request) -> BoxFuture<'static, ()>;
}

impl<F, Fut> Handler for F
where
    F: Fn(ResponseWriter, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    fn call(&self, w: ResponseWriter, req: Request) -> BoxFuture<'static, ()> {
        Box::pin(self(w, req))
    }
}

pub type BoxedHandler = Arc<dyn Handler>;

/// The ordered handlers of one route, plus its fall-through flag.
#[derive(Clone)]
pub struct HandlerSequence {
    handlers: Arc<[BoxedHandler]>,
    fall_through: bool,
}

impl HandlerSequence {
    pub(crate) fn new(handlers: Vec<BoxedHandler>, fall_through: bool) -> Self {
        Self {
            handlers: handlers.into(),
            fall_through,
        }
    }

    pub fn falls_through(&self) -> bool {
        self.fall_through
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Handlers that run for a match: every one of them when the route
    /// falls through, otherwise only the first.
    pub fn active(&self) -> &[BoxedHandler] {
        if self.fall_through {
            &self.handlers
        } else {
            &self.handlers[..self.handlers.len().min(1)]
        }
    }

    /// Run the active handlers in order.
    ///
    /// With fall-through every handler is awaited in turn whether or not an
    /// earlier one already wrote the response.
    pub async fn run(&self, w: ResponseWriter, req: Request) {
        for (index, handler) in self.active().iter().enumerate() {
            tracing::trace!(handler = index, "Running handler");
            handler.call(w.clone(), req.clone()).await;
        }
    }
}

impl fmt::Debug for HandlerSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerSequence")
            .field("len", &self.handlers.len())
            .field("fall_through", &self.fall_through)
            .finish()
    }
}
