//! Configuration validation.
//!
//! Serde handles syntax; this module checks value ranges and cross-field
//! rules. Every problem is reported, not just the first one.

use std::net::SocketAddr;

use crate::config::schema::{ParseStrategy, RelayConfig};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} is not a valid socket address: {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("forwarding.delimiter must be non-empty and must not be \"/\" when the delimiter strategy is selected")]
    InvalidDelimiter,
}

/// Validate a parsed configuration.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    let positive = [
        ("listener.request_timeout_secs", config.listener.request_timeout_secs),
        ("forwarding.connect_timeout_secs", config.forwarding.connect_timeout_secs),
        ("forwarding.request_timeout_secs", config.forwarding.request_timeout_secs),
        ("limits.max_body_bytes", config.limits.max_body_bytes as u64),
    ];
    for (field, value) in positive {
        if value == 0 {
            errors.push(ValidationError::Zero { field });
        }
    }

    if config.forwarding.strategy == ParseStrategy::Delimiter {
        let delimiter = config.forwarding.delimiter.as_str();
        if delimiter.is_empty() || delimiter == "/" {
            errors.push(ValidationError::InvalidDelimiter);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
