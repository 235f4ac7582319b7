//! Route registration and compilation.
//!
//! # Responsibilities
//! - Describe routes (name, method, pattern, policies, handlers)
//! - Compile every pattern once, at construction
//! - Hold the ordered, immutable route list
//!
//! # Design Decisions
//! - Ordered `Vec`, not a map: registration order resolves overlaps
//! - Immutable after construction (thread-safe without locks)
//! - Malformed routes fail construction, never a request

use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::http::handler::{BoxedHandler, Handler, HandlerSequence};
use crate::routing::method::Method;
use crate::routing::pattern::{Pattern, PatternError};

/// Configuration errors detected while building a route table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("route `{route}`: invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        route: String,
        pattern: String,
        #[source]
        source: PatternError,
    },
    #[error("route `{route}` has no handlers")]
    NoHandlers { route: String },
}

/// A route descriptor, as supplied by the application.
pub struct Route {
    name: String,
    method: Method,
    pattern: String,
    trailing_slash: bool,
    fall_through: bool,
    handlers: Vec<BoxedHandler>,
}

impl Route {
    /// Describe a route. `name` is a label for diagnostics and need not be unique.
    pub fn new(name: impl Into<String>, method: Method, pattern: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            method,
            pattern: pattern.into(),
            trailing_slash: false,
            fall_through: false,
            handlers: Vec::new(),
        }
    }

    /// Append a handler to the route's handler sequence.
    pub fn handler<H: Handler>(mut self, handler: H) -> Self {
        self.handlers.push(Arc::new(handler));
        self
    }

    /// Accept the request path both with and without a trailing `/`.
    pub fn trailing_slash(mut self, enabled: bool) -> Self {
        self.trailing_slash = enabled;
        self
    }

    /// Run every handler in the sequence instead of only the first.
    ///
    /// Handlers are invoked unconditionally, in order. Nothing checks
    /// whether an earlier handler already produced the response, so later
    /// handlers must not assume they own it.
    pub fn fall_through(mut self, enabled: bool) -> Self {
        self.fall_through = enabled;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("name", &self.name)
            .field("method", &self.method)
            .field("pattern", &self.pattern)
            .field("trailing_slash", &self.trailing_slash)
            .field("fall_through", &self.fall_through)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

/// A route whose pattern has been compiled.
pub struct CompiledRoute {
    name: String,
    method: Method,
    pattern: Pattern,
    trailing_slash: bool,
    handlers: HandlerSequence,
}

impl CompiledRoute {
    fn compile(route: Route) -> Result<Self, RouteError> {
        let pattern = Pattern::compile(&route.pattern).map_err(|source| RouteError::InvalidPattern {
            route: route.name.clone(),
            pattern: route.pattern.clone(),
            source,
        })?;

        if route.handlers.is_empty() {
            return Err(RouteError::NoHandlers { route: route.name });
        }

        Ok(Self {
            name: route.name,
            method: route.method,
            pattern,
            trailing_slash: route.trailing_slash,
            handlers: HandlerSequence::new(route.handlers, route.fall_through),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn allows_trailing_slash(&self) -> bool {
        self.trailing_slash
    }

    pub fn falls_through(&self) -> bool {
        self.handlers.falls_through()
    }

    pub fn handlers(&self) -> &HandlerSequence {
        &self.handlers
    }
}

impl fmt::Debug for CompiledRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledRoute")
            .field("name", &self.name)
            .field("method", &self.method)
            .field("pattern", &self.pattern.as_str())
            .field("trailing_slash", &self.trailing_slash)
            .field("handlers", &self.handlers)
            .finish()
    }
}

/// Ordered collection of compiled routes.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<CompiledRoute>,
}

impl RouteTable {
    /// Compile `routes` in registration order.
    pub fn new(routes: Vec<Route>) -> Result<Self, RouteError> {
        let routes = routes
            .into_iter()
            .map(CompiledRoute::compile)
            .collect::<Result<Vec<_>, _>>()?;

        for route in &routes {
            tracing::debug!(
                name = %route.name,
                method = %route.method,
                pattern = %route.pattern.as_str(),
                trailing_slash = route.trailing_slash,
                fall_through = route.falls_through(),
                "Route registered"
            );
        }

        Ok(Self { routes })
    }

    pub fn routes(&self) -> impl Iterator<Item = &CompiledRoute> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
