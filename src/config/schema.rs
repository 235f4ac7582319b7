//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration for the server.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host or IP address both listeners bind to.
    pub host: String,

    /// Plaintext HTTP port.
    pub port: u16,

    /// TLS port.
    pub https_port: u16,

    /// Path to certificate file (PEM). Required by the TLS listener.
    pub cert_file: Option<PathBuf>,

    /// Path to private key file (PEM). Required by the TLS listener.
    pub key_file: Option<PathBuf>,

    /// Seconds a client has to send its request headers.
    pub read_timeout_secs: u64,

    /// Seconds a request may take from headers received to response sent.
    pub write_timeout_secs: u64,

    /// Grace period for in-flight requests when a listener shuts down.
    pub shutdown_timeout_secs: u64,

    /// Largest request body accepted, in bytes.
    pub max_body_bytes: usize,

    /// Development only. Never enable in production.
    pub insecure_skip_verify: bool,

    /// Fallback log filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            https_port: 8443,
            cert_file: None,
            key_file: None,
            read_timeout_secs: 15,
            write_timeout_secs: 60,
            shutdown_timeout_secs: 10,
            max_body_bytes: 2 * 1024 * 1024, // 2MB
            insecure_skip_verify: false,
            log_level: "info".to_string(),
        }
    }
}

impl ServerConfig {
    /// `host:port` for the plaintext listener.
    pub fn http_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// `host:https_port` for the TLS listener.
    pub fn https_address(&self) -> String {
        format!("{}:{}", self.host, self.https_port)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_secs)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}
