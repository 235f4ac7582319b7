//! The router: route table, middleware chain, and shared app context.
//!
//! # Responsibilities
//! - Own the compiled route table
//! - Collect middleware before serving begins
//! - Hold the application context handed to every request
//!
//! # Design Decisions
//! - Explicit value, never a process-wide singleton; several routers may
//!   coexist (one per server, one per test)
//! - Mutation needs `&mut self`; once wrapped in `Arc` for serving, the
//!   router is read-only and needs no locks

use std::sync::Arc;

use crate::http::context::AppContext;
use crate::http::middleware::{Middleware, MiddlewareChain};
use crate::routing::table::{Route, RouteError, RouteTable};

#[derive(Debug)]
pub struct Router {
    table: RouteTable,
    middleware: MiddlewareChain,
    app: Arc<AppContext>,
}

impl Router {
    /// Compile `routes` and attach the shared application context.
    ///
    /// Fails on the first malformed route.
    pub fn new(routes: Vec<Route>, app: AppContext) -> Result<Self, RouteError> {
        let table = RouteTable::new(routes)?;
        tracing::info!(
            routes = table.len(),
            app_context_keys = app.len(),
            "Router built"
        );
        Ok(Self {
            table,
            middleware: MiddlewareChain::new(),
            app: Arc::new(app),
        })
    }

    /// Append a middleware. Runs after every middleware registered before it.
    pub fn use_middleware<M: Middleware>(&mut self, middleware: M) -> &mut Self {
        self.middleware.push(middleware);
        self
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn middleware(&self) -> &MiddlewareChain {
        &self.middleware
    }

    pub fn app_context(&self) -> &Arc<AppContext> {
        &self.app
    }
}
