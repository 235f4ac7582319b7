//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! ServerConfig (cert_file, key_file)
//!     → tls.rs (load PEM files into a rustls config)
//!     → TLS listener in http::server
//! ```
//!
//! # Design Decisions
//! - Socket setup and the TLS handshake are delegated to axum / axum-server
//! - Certificate problems surface when the TLS listener starts

pub mod tls;
