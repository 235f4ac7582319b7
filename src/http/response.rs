//! Response writer handed to middleware and handlers.
//!
//! # Responsibilities
//! - Collect status, headers, and body written by application code
//! - Commit status and headers on the first status or body write
//! - Turn the collected state into a wire response once the chain returns
//!
//! # Design Decisions
//! - Clones share one response, so every stage of a request writes to
//!   the same place
//! - A second status write is ignored and logged, never an error
//! - Nothing is sent until the dispatcher finishes the request

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::Response;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct State {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: Vec<u8>,
}

/// Handle through which a request's response is produced.
#[derive(Debug, Clone, Default)]
pub struct ResponseWriter {
    state: Arc<Mutex<State>>,
}

impl ResponseWriter {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Set the status code. Only the first call has an effect.
    pub fn write_status(&self, status: StatusCode) {
        let mut state = self.lock();
        match state.status {
            None => state.status = Some(status),
            Some(current) => {
                tracing::warn!(
                    current = current.as_u16(),
                    ignored = status.as_u16(),
                    "Superfluous status write"
                );
            }
        }
    }

    /// Append a header value. Ignored once the status is committed.
    pub fn write_header(&self, name: HeaderName, value: HeaderValue) {
        let mut state = self.lock();
        if state.status.is_some() {
            tracing::debug!(header = %name, "Header written after status, ignoring");
            return;
        }
        state.headers.append(name, value);
    }

    /// Replace all values of a header. Ignored once the status is committed.
    pub fn set_header(&self, name: HeaderName, value: HeaderValue) {
        let mut state = self.lock();
        if state.status.is_some() {
            tracing::debug!(header = %name, "Header written after status, ignoring");
            return;
        }
        state.headers.insert(name, value);
    }

    /// Append to the body. Commits a 200 status if none was written.
    pub fn write_body(&self, chunk: impl AsRef<[u8]>) {
        let mut state = self.lock();
        state.status.get_or_insert(StatusCode::OK);
        state.body.extend_from_slice(chunk.as_ref());
    }

    /// The committed status, if any.
    pub fn status(&self) -> Option<StatusCode> {
        self.lock().status
    }

    /// Whether a status has been committed.
    pub fn is_committed(&self) -> bool {
        self.lock().status.is_some()
    }

    /// A copy of the headers written so far.
    pub fn headers(&self) -> HeaderMap {
        self.lock().headers.clone()
    }

    pub fn body_len(&self) -> usize {
        self.lock().body.len()
    }

    /// Drain the collected state into a response.
    ///
    /// An untouched writer yields an empty 200 response.
    pub(crate) fn into_response(self) -> Response {
        let state = std::mem::take(&mut *self.lock());
        let mut response = Response::new(Body::from(state.body));
        *response.status_mut() = state.status.unwrap_or(StatusCode::OK);
        *response.headers_mut() = state.headers;
        response
    }
}

/// Build a plain-text response outside any handler (404, 501, 500).
pub(crate) fn plain(status: StatusCode) -> Response {
    let text = status.canonical_reason().unwrap_or("Unknown Status");
    let mut response = Response::new(Body::from(text));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}
