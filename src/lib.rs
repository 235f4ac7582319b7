//! Minimal HTTP request router.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ─────────────▶ http::server ──▶ http::dispatcher ──▶ routing::matcher
//!                    (plain / TLS)    (501 / 404 / 500)     (first match wins)
//!                                            │
//!                                            ▼
//!                                     http::middleware ──▶ handlers
//!                                     (outermost first)    (optional fall-through)
//!
//!     Cross-cutting: config (TOML), observability (tracing), lifecycle (signals)
//! ```
//!
//! Routes are declared once, compiled into an immutable table and shared by
//! every request. Each matched request gets its own context carrying the
//! path parameters and the application-wide values.

// Core subsystems
pub mod config;
pub mod http;
pub mod net;
pub mod routing;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::ServerConfig;
pub use http::{AppContext, Request, ResponseWriter, Server};
pub use routing::{Method, Route, Router};
