//! Configuration loading from disk and environment.
//!
//! Precedence: built-in defaults, then the optional TOML file, then
//! `GATEWAY_*` / `SERVICE<N>_URL` environment variables.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{GatewayConfig, RouteConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value '{value}' for environment variable {name}")]
    InvalidEnv { name: String, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration.
///
/// When `path` is `None` the defaults plus process environment are used.
pub fn load_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => GatewayConfig::default(),
    };

    apply_env_overrides(&mut config, std::env::vars())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply environment overrides on top of an already-parsed config.
///
/// `SERVICE<N>_URL` registers (or retargets) route `service<N>` at
/// `/api/service<N>`.
pub fn apply_env_overrides<I>(config: &mut GatewayConfig, vars: I) -> Result<(), ConfigError>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut host = None;
    let mut port = None;
    let mut service_urls = Vec::new();

    for (name, value) in vars {
        match name.as_str() {
            "GATEWAY_HOST" => host = Some(value),
            "GATEWAY_PORT" => port = Some(parse_env::<u16>(&name, &value)?),
            "GATEWAY_TIMEOUT" => config.timeouts.default_secs = parse_env(&name, &value)?,
            "GATEWAY_MAX_BODY_SIZE" => config.limits.max_body_size = parse_env(&name, &value)?,
            "GATEWAY_LOG_LEVEL" => config.observability.log_level = value.to_lowercase(),
            _ => {
                if let Some(service) = service_env_name(&name) {
                    service_urls.push((service, value));
                }
            }
        }
    }

    if host.is_some() || port.is_some() {
        let (current_host, current_port) = split_bind_address(&config.listener.bind_address);
        let host = host.unwrap_or(current_host);
        let port = port.map(|p| p.to_string()).unwrap_or(current_port);
        config.listener.bind_address = format!("{}:{}", host, port);
    }

    // Environment iteration order is unspecified.
    service_urls.sort();
    for (service, url) in service_urls {
        match config.routes.iter_mut().find(|r| r.name == service) {
            Some(route) => route.target_url = url,
            None => {
                let prefix = format!("/api/{}", service);
                config.routes.push(RouteConfig::new(service, prefix, url));
            }
        }
    }

    Ok(())
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        name: name.to_string(),
        value: value.to_string(),
    })
}

/// `SERVICE12_URL` → `service12`.
fn service_env_name(name: &str) -> Option<String> {
    let digits = name.strip_prefix("SERVICE")?.strip_suffix("_URL")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(format!("service{}", digits))
}

fn split_bind_address(addr: &str) -> (String, String) {
    match addr.rsplit_once(':') {
        Some((host, port)) => (host.to_string(), port.to_string()),
        None => (addr.to_string(), "8000".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_env_overrides_scalars() {
        let mut config = GatewayConfig::default();
        apply_env_overrides(
            &mut config,
            vars(&[
                ("GATEWAY_PORT", "9000"),
                ("GATEWAY_TIMEOUT", "12"),
                ("GATEWAY_MAX_BODY_SIZE", "1024"),
                ("GATEWAY_LOG_LEVEL", "DEBUG"),
                ("PATH", "/usr/bin"),
            ]),
        )
        .unwrap();

        assert_eq!(config.listener.bind_address, "0.0.0.0:9000");
        assert_eq!(config.timeouts.default_secs, 12);
        assert_eq!(config.limits.max_body_size, 1024);
        assert_eq!(config.observability.log_level, "debug");
    }

    #[test]
    fn test_env_host_keeps_port() {
        let mut config = GatewayConfig::default();
        apply_env_overrides(&mut config, vars(&[("GATEWAY_HOST", "127.0.0.1")])).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:8000");
    }

    #[test]
    fn test_env_service_urls_register_routes() {
        let mut config = GatewayConfig::default();
        apply_env_overrides(
            &mut config,
            vars(&[
                ("SERVICE2_URL", "http://svc2:8002"),
                ("SERVICE1_URL", "http://svc1:8001"),
                ("SERVICEX_URL", "http://ignored"),
            ]),
        )
        .unwrap();

        assert_eq!(config.routes.len(), 2);
        assert_eq!(config.routes[0].name, "service1");
        assert_eq!(config.routes[0].prefix, "/api/service1");
        assert_eq!(config.routes[0].target_url, "http://svc1:8001");
        assert!(config.routes[0].strip_prefix);
        assert_eq!(config.routes[1].name, "service2");
    }

    #[test]
    fn test_env_service_url_retargets_existing_route() {
        let mut config = GatewayConfig::default();
        config
            .routes
            .push(RouteConfig::new("service1", "/svc-one", "http://old:1"));
        apply_env_overrides(&mut config, vars(&[("SERVICE1_URL", "http://new:2")])).unwrap();

        assert_eq!(config.routes.len(), 1);
        assert_eq!(config.routes[0].prefix, "/svc-one");
        assert_eq!(config.routes[0].target_url, "http://new:2");
    }

    #[test]
    fn test_env_invalid_number() {
        let mut config = GatewayConfig::default();
        let err = apply_env_overrides(&mut config, vars(&[("GATEWAY_TIMEOUT", "soon")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_config(Some(Path::new("/nonexistent/gateway.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
