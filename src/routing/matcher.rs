//! Route matching logic.
//!
//! # Responsibilities
//! - Walk the route table in registration order
//! - Apply each route's trailing-slash policy
//! - Extract named parameters positionally
//! - Classify misses (no path match vs wrong method)
//!
//! # Design Decisions
//! - Pure in-memory computation, no I/O, no locks
//! - First route matching both path and method wins
//! - Deterministic: same input always matches same route

use serde::Serialize;
use std::collections::HashMap;

use crate::routing::method::Method;
use crate::routing::pattern::split_path;
use crate::routing::table::{CompiledRoute, RouteTable};

/// Path parameters extracted from a request, keyed by declared name.
///
/// Values are always the raw path segment; no type coercion happens here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Params(HashMap<String, String>);

impl Params {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub(crate) fn insert(&mut self, name: String, value: String) {
        self.0.insert(name, value);
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Why a request found no route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissKind {
    /// No registered pattern matches the path.
    NoPathMatch,
    /// At least one pattern matches the path, but only for other methods.
    MethodNotAllowed,
}

/// Outcome of a lookup. Produced per request and consumed immediately.
#[derive(Debug)]
pub enum MatchResult<'a> {
    Matched {
        route: &'a CompiledRoute,
        params: Params,
    },
    Miss(MissKind),
}

impl<'a> MatchResult<'a> {
    pub fn is_match(&self) -> bool {
        matches!(self, MatchResult::Matched { .. })
    }

    pub fn miss_kind(&self) -> Option<MissKind> {
        match self {
            MatchResult::Miss(kind) => Some(*kind),
            MatchResult::Matched { .. } => None,
        }
    }
}

impl RouteTable {
    /// Find the route answering `method` on `path`.
    ///
    /// `path` must not carry a query string.
    pub fn find(&self, method: Method, path: &str) -> MatchResult<'_> {
        let (parts, trailing) = split_path(path);
        let mut path_matched = false;

        for route in self.routes() {
            if route.pattern().segment_count() != parts.len() {
                continue;
            }
            if !route.allows_trailing_slash() && trailing != route.pattern().has_trailing_slash() {
                continue;
            }

            let Some(params) = route.pattern().capture(&parts) else {
                continue;
            };

            if route.method() == method {
                return MatchResult::Matched { route, params };
            }
            path_matched = true;
        }

        if path_matched {
            MatchResult::Miss(MissKind::MethodNotAllowed)
        } else {
            MatchResult::Miss(MissKind::NoPathMatch)
        }
    }
}
