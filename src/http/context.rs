//! Per-request context and shared application context.
//!
//! # Data Flow
//! ```text
//! Router construction:
//!     AppContext (built once) → Arc<AppContext>
//!
//! Per matched request:
//!     Params (from matcher) + Arc<AppContext>
//!     → RequestContext
//!     → carried inside the Request handed to middleware and handlers
//!     → dropped with the request
//! ```
//!
//! # Design Decisions
//! - Params are owned by exactly one request, never shared
//! - AppContext is immutable after construction, so reads need no lock
//! - No task-local or global lookup: the context travels with the request

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::routing::Params;

/// Read-only values shared by every request served by a router.
#[derive(Default)]
pub struct AppContext {
    values: HashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl AppContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value under `key`, replacing any previous one.
    pub fn with<T: Any + Send + Sync>(mut self, key: impl Into<String>, value: T) -> Self {
        self.values.insert(key.into(), Arc::new(value));
        self
    }

    /// Typed lookup. `None` when the key is absent or holds another type.
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.values.get(key).and_then(|v| v.downcast_ref::<T>())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for AppContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.values.keys()).finish()
    }
}

/// Everything a handler can know about the route that matched.
#[derive(Debug, Clone)]
pub struct RequestContext {
    params: Params,
    app: Arc<AppContext>,
}

impl RequestContext {
    pub fn new(params: Params, app: Arc<AppContext>) -> Self {
        Self { params, app }
    }

    /// Path parameters extracted for this request.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Shorthand for `params().get(name)`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    pub fn app(&self) -> &AppContext {
        &self.app
    }
}
