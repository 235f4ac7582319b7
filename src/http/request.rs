//! Request handle passed to middleware and handlers.
//!
//! # Responsibilities
//! - Expose the request line, headers, and extensions
//! - Carry the per-request context (params + app context)
//! - Hand out the body exactly once
//!
//! # Design Decisions
//! - Cloning is cheap and yields the same request, so a fall-through
//!   sequence sees one request, like the middleware before it
//! - Once the body is taken, later readers observe an empty body

use axum::body::{Body, Bytes};
use axum::http::request::Parts;
use axum::http::{Extensions, HeaderMap, Method, Uri, Version};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use crate::http::context::RequestContext;
use crate::routing::Params;

/// Header carrying the request ID generated at the edge of the stack.
pub const X_REQUEST_ID: &str = "x-request-id";

/// An in-flight request together with its context.
#[derive(Clone)]
pub struct Request {
    inner: Arc<Inner>,
}

struct Inner {
    head: Parts,
    body: Mutex<Option<Body>>,
    context: RequestContext,
}

impl Request {
    /// Bind `context` to a wire-level request.
    pub fn from_http(req: axum::http::Request<Body>, context: RequestContext) -> Self {
        let (head, body) = req.into_parts();
        Self {
            inner: Arc::new(Inner {
                head,
                body: Mutex::new(Some(body)),
                context,
            }),
        }
    }

    pub fn method(&self) -> &Method {
        &self.inner.head.method
    }

    pub fn uri(&self) -> &Uri {
        &self.inner.head.uri
    }

    pub fn path(&self) -> &str {
        self.inner.head.uri.path()
    }

    pub fn query(&self) -> Option<&str> {
        self.inner.head.uri.query()
    }

    pub fn version(&self) -> Version {
        self.inner.head.version
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.inner.head.headers
    }

    /// Value of a header, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.inner.head.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn extensions(&self) -> &Extensions {
        &self.inner.head.extensions
    }

    pub fn request_id(&self) -> Option<&str> {
        self.header(X_REQUEST_ID)
    }

    /// The context bound to this request by the dispatcher.
    pub fn context(&self) -> &RequestContext {
        &self.inner.context
    }

    /// Shorthand for `context().param(name)`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.inner.context.param(name)
    }

    pub fn params(&self) -> &Params {
        self.inner.context.params()
    }

    /// Take the body. Every call after the first returns an empty body.
    pub fn take_body(&self) -> Body {
        self.inner
            .body
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .unwrap_or_else(Body::empty)
    }

    /// Take the body and collect it.
    ///
    /// Size limits are enforced by the server stack, not here.
    pub async fn read_body(&self) -> Result<Bytes, axum::Error> {
        axum::body::to_bytes(self.take_body(), usize::MAX).await
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("method", self.method())
            .field("uri", self.uri())
            .field("context", self.context())
            .finish()
    }
}
