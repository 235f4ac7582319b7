//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup):
//!     Route[] (name, method, pattern, policies, handlers)
//!     → pattern.rs (split into literal / :param segments, validate)
//!     → table.rs (ordered, immutable RouteTable)
//!     → router.rs (table + middleware + app context)
//!
//! Incoming Request (method, path):
//!     → matcher.rs (registration-order scan)
//!     → Return: Matched { route, params } or Miss(kind)
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (literal and named segments only)
//! - Deterministic: same input always matches same route
//! - First match wins (registration order)

pub mod matcher;
pub mod method;
pub mod pattern;
pub mod router;
pub mod table;

pub use matcher::{MatchResult, MissKind, Params};
pub use method::Method;
pub use pattern::{Pattern, PatternError};
pub use router::Router;
pub use table::{CompiledRoute, Route, RouteError, RouteTable};
