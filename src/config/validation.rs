//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, body limit > 0)
//! - Detect conflicting listener settings
//!
//! # Design Decisions
//! - Port 0 is allowed and means "any free port"
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::schema::ServerConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("host must not be empty")]
    EmptyHost,
    #[error("`{field}` must not be 0")]
    ZeroValue { field: &'static str },
    #[error("port and https_port are both {0}")]
    PortClash(u16),
    #[error("`{present}` is set but `{missing}` is not")]
    IncompleteTls {
        present: &'static str,
        missing: &'static str,
    },
}

pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.host.trim().is_empty() {
        errors.push(ValidationError::EmptyHost);
    }

    let numeric = [
        ("read_timeout_secs", config.read_timeout_secs),
        ("write_timeout_secs", config.write_timeout_secs),
        ("shutdown_timeout_secs", config.shutdown_timeout_secs),
        ("max_body_bytes", config.max_body_bytes as u64),
    ];
    for (field, value) in numeric {
        if value == 0 {
            errors.push(ValidationError::ZeroValue { field });
        }
    }

    if config.port != 0 && config.port == config.https_port {
        errors.push(ValidationError::PortClash(config.port));
    }

    match (&config.cert_file, &config.key_file) {
        (Some(_), None) => errors.push(ValidationError::IncompleteTls {
            present: "cert_file",
            missing: "key_file",
        }),
        (None, Some(_)) => errors.push(ValidationError::IncompleteTls {
            present: "key_file",
            missing: "cert_file",
        }),
        _ => {}
    }

    if config.insecure_skip_verify {
        tracing::warn!("insecure_skip_verify is enabled; use only for development");
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
