//! HTTP request handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (axum-server listener, tower-http layers)
//!     → dispatcher.rs (method check, route lookup, context binding)
//!     → middleware.rs (registered chain, outermost first)
//!     → handler.rs (first handler, or all of them with fall-through)
//!     → response.rs (buffered status, headers, body)
//!     → Send to client
//! ```
//!
//! # Design Decisions
//! - Handlers receive the request context explicitly inside `Request`
//! - `ResponseWriter` and `Request` are cheap handles shared by every stage
//! - render.rs carries the JSON envelope helpers used by handlers

pub mod context;
pub mod dispatcher;
pub mod handler;
pub mod middleware;
pub mod render;
pub mod request;
pub mod response;
pub mod server;

pub use context::{AppContext, RequestContext};
pub use dispatcher::Dispatcher;
pub use handler::{BoxedHandler, Handler, HandlerSequence};
pub use middleware::{BoxedMiddleware, Middleware, MiddlewareChain, Next};
pub use request::{Request, X_REQUEST_ID};
pub use response::ResponseWriter;
pub use server::{LifecycleError, ListenerKind, Server};
