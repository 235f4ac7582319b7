//! TLS configuration and certificate loading.

use axum_server::tls_rustls::RustlsConfig;
use std::io;
use std::path::Path;

use crate::config::ServerConfig;

/// Load the rustls configuration for the TLS listener from `config`.
///
/// Both `cert_file` and `key_file` must be set. `insecure_skip_verify`
/// only produces a warning: the listener never requests client
/// certificates, so there is no peer verification to skip.
pub async fn load_server_tls(config: &ServerConfig) -> io::Result<RustlsConfig> {
    let (Some(cert), Some(key)) = (&config.cert_file, &config.key_file) else {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "TLS listener requires both cert_file and key_file",
        ));
    };

    if config.insecure_skip_verify {
        tracing::warn!("insecure_skip_verify is set; never use this in production");
    }

    load_tls_config(cert, key).await
}

/// Load TLS configuration from PEM certificate and key files.
pub async fn load_tls_config(cert_path: &Path, key_path: &Path) -> io::Result<RustlsConfig> {
    for (kind, path) in [("Certificate", cert_path), ("Private key", key_path)] {
        if !path.exists() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} file not found: {}", kind, path.display()),
            ));
        }
    }

    let config = RustlsConfig::from_pem_file(cert_path, key_path).await?;
    tracing::debug!(
        cert = %cert_path.display(),
        key = %key_path.display(),
        "TLS certificate loaded"
    );
    Ok(config)
}
