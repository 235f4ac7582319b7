//! Request dispatch.
//!
//! # Data Flow
//! ```text
//! Received
//!     → method outside the supported set?  → Rejected (501)
//!     → matcher miss (path or method)?     → Rejected (404)
//!     → Matched
//!     → ContextBound (params + app context bound into Request)
//!     → MiddlewareRunning
//!     → HandlersRunning (first handler, or all with fall-through)
//!     → Completed (collected response returned)
//! ```
//!
//! # Design Decisions
//! - Method mismatch and path miss both answer 404; the kind is only logged
//! - A panic in middleware or handlers becomes a 500 for that request only
//! - No timeout here; deadlines belong to the server stack

use axum::extract::Request as HttpRequest;
use axum::http::StatusCode;
use axum::response::Response;
use futures_util::future::{BoxFuture, FutureExt};
use std::any::Any;
use std::convert::Infallible;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::Service;

use crate::http::context::RequestContext;
use crate::http::request::{Request, X_REQUEST_ID};
use crate::http::response::{plain, ResponseWriter};
use crate::routing::{MatchResult, Method, Router};

/// Entry point for every request: a `tower::Service` over a shared router.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    router: Arc<Router>,
}

impl Dispatcher {
    pub fn new(router: Arc<Router>) -> Self {
        Self { router }
    }

    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    /// Route one request and produce its response.
    pub async fn dispatch(&self, req: HttpRequest) -> Response {
        let request_id = req
            .headers()
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
            .to_string();
        let path = req.uri().path().to_string();

        tracing::trace!(
            request_id = %request_id,
            method = %req.method(),
            path = %path,
            "Request received"
        );

        let Some(method) = Method::from_http(req.method()) else {
            tracing::debug!(
                request_id = %request_id,
                method = %req.method(),
                path = %path,
                "Unsupported method"
            );
            return plain(StatusCode::NOT_IMPLEMENTED);
        };

        let (route_name, handlers, params) = match self.router.table().find(method, &path) {
            MatchResult::Matched { route, params } => {
                (route.name().to_string(), route.handlers().clone(), params)
            }
            MatchResult::Miss(kind) => {
                tracing::debug!(
                    request_id = %request_id,
                    method = %method,
                    path = %path,
                    miss = ?kind,
                    "No route matched"
                );
                return plain(StatusCode::NOT_FOUND);
            }
        };

        tracing::debug!(
            request_id = %request_id,
            method = %method,
            path = %path,
            route = %route_name,
            params = params.len(),
            "Route matched"
        );

        let context = RequestContext::new(params, Arc::clone(self.router.app_context()));
        let request = Request::from_http(req, context);
        let writer = ResponseWriter::new();

        let chain = self.router.middleware().start(handlers);
        let outcome = AssertUnwindSafe(chain.run(writer.clone(), request))
            .catch_unwind()
            .await;

        match outcome {
            Ok(()) => {
                let response = writer.into_response();
                tracing::trace!(
                    request_id = %request_id,
                    route = %route_name,
                    status = response.status().as_u16(),
                    "Request completed"
                );
                response
            }
            Err(panic) => {
                tracing::error!(
                    request_id = %request_id,
                    route = %route_name,
                    panic = %panic_message(panic.as_ref()),
                    "Handler panicked"
                );
                plain(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}

impl Service<HttpRequest> for Dispatcher {
    type Response = Response;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Response, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: HttpRequest) -> Self::Future {
        let this = self.clone();
        Box::pin(async move { Ok(this.dispatch(req).await) })
    }
}
