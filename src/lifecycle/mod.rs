//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (binary):
//!     Load config → Validate → Build router → Start listeners
//!
//! Shutdown:
//!     Signal received (signals.rs) → Stop accepting → Drain within grace → Exit
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then router, then listeners
//! - Shutdown has timeout: forced close after deadline
//! - Listener start/stop lives on `http::Server`; this module only
//!   translates process signals

pub mod signals;

pub use signals::wait_for_signal;
