//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Route definitions mapping URL prefixes to backends.
    pub routes: Vec<RouteConfig>,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Outbound connection pool settings.
    pub pool: PoolConfig,

    /// Request limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Route hot reload.
    pub reload: ReloadConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
        }
    }
}

/// A single backend route as written in the config file.
///
/// This is the unvalidated form; `RouteTable::load` turns it into a
/// `RouteDescriptor`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct RouteConfig {
    /// Unique route identifier for logging/metrics.
    pub name: String,

    /// Path prefix to match (e.g. "/api/service1").
    pub prefix: String,

    /// Backend base URL (e.g. "http://svc1:8001").
    pub target_url: String,

    /// Remove the matched prefix before forwarding.
    #[serde(default = "default_strip_prefix")]
    pub strip_prefix: bool,

    /// Per-route timeout in seconds; falls back to `timeouts.default_secs`.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_strip_prefix() -> bool {
    true
}

impl RouteConfig {
    /// Route with `strip_prefix = true` and no timeout override.
    pub fn new(
        name: impl Into<String>,
        prefix: impl Into<String>,
        target_url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            prefix: prefix.into(),
            target_url: target_url.into(),
            strip_prefix: true,
            timeout_secs: None,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Gateway-wide request deadline in seconds (connect + send + receive).
    pub default_secs: u64,

    /// Limit on establishing a backend TCP/TLS connection, in seconds.
    /// The request deadline still applies when it is shorter.
    pub connect_secs: u64,

    /// How long an idle pooled backend connection is kept, in seconds.
    pub pool_idle_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            default_secs: 30,
            connect_secs: 5,
            pool_idle_secs: 90,
        }
    }
}

/// Outbound connection pool configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Maximum idle connections kept per backend host.
    pub max_idle_per_host: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_idle_per_host: 32,
        }
    }
}

/// Request size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum request body size in bytes.
    pub max_body_size: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_size: 10 * 1024 * 1024, // 10MB
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable the Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Json,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Route hot reload configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ReloadConfig {
    /// Watch the config file and swap in new routes on change.
    pub enabled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: GatewayConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8000");
        assert_eq!(config.timeouts.default_secs, 30);
        assert_eq!(config.timeouts.connect_secs, 5);
        assert_eq!(config.limits.max_body_size, 10 * 1024 * 1024);
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert!(config.routes.is_empty());
        assert!(!config.reload.enabled);
    }

    #[test]
    fn test_route_defaults() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [[routes]]
            name = "service1"
            prefix = "/api/service1"
            target_url = "http://svc1:8001"

            [[routes]]
            name = "service2"
            prefix = "/api/service2"
            target_url = "http://svc2:8002"
            strip_prefix = false
            timeout_secs = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.routes.len(), 2);
        assert!(config.routes[0].strip_prefix);
        assert_eq!(config.routes[0].timeout_secs, None);
        assert!(!config.routes[1].strip_prefix);
        assert_eq!(config.routes[1].timeout_secs, Some(5));
    }
}
