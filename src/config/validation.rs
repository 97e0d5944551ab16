//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, body limit > 0, bind address parses)
//! - Delegate route checks to `RouteTable::load`
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::loader::ConfigError;
use crate::config::schema::GatewayConfig;
use crate::routing::RouteTable;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid bind address '{0}'")]
    InvalidBindAddress(String),

    #[error("timeouts.default_secs must be greater than zero")]
    NonPositiveDefaultTimeout,

    #[error("timeouts.connect_secs must be greater than zero")]
    NonPositiveConnectTimeout,

    #[error("limits.max_body_size must be greater than zero")]
    ZeroMaxBodySize,

    #[error("route '{route}': prefix '{prefix}' must start with '/' and not be empty")]
    InvalidPrefix { route: String, prefix: String },

    #[error("route '{route}': prefix '{prefix}' is reserved for gateway endpoints")]
    ReservedPrefix { route: String, prefix: String },

    #[error("route '{route}': invalid target url '{url}': {reason}")]
    InvalidTarget {
        route: String,
        url: String,
        reason: String,
    },

    #[error("route '{route}': unsupported target scheme '{scheme}' (only http and https)")]
    UnsupportedScheme { route: String, scheme: String },

    #[error("route '{route}': timeout_secs must be greater than zero")]
    NonPositiveTimeout { route: String },

    #[error("routes '{first}' and '{second}' share prefix '{prefix}'")]
    DuplicatePrefix {
        prefix: String,
        first: String,
        second: String,
    },

    #[error("route name '{0}' is used more than once")]
    DuplicateName(String),
}

/// Validate scalar settings and the route list.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }
    if config.timeouts.default_secs == 0 {
        errors.push(ValidationError::NonPositiveDefaultTimeout);
    }
    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::NonPositiveConnectTimeout);
    }
    if config.limits.max_body_size == 0 {
        errors.push(ValidationError::ZeroMaxBodySize);
    }

    if let Err(ConfigError::Validation(route_errors)) = RouteTable::load(&config.routes) {
        errors.extend(route_errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
