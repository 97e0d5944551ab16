//! Route table: validated, immutable backend descriptors.
//!
//! # Responsibilities
//! - Turn `RouteConfig` entries into `RouteDescriptor`s
//! - Reject invalid prefixes, targets, timeouts and duplicates
//! - Keep descriptors ordered for longest-prefix lookup
//!
//! # Design Decisions
//! - Built once at startup (or on reload) and never mutated
//! - All problems are reported together, like `validate_config`

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use axum::http::Uri;
use url::Url;

use crate::config::{ConfigError, RouteConfig, ValidationError};
use crate::routing::matcher::PathPrefixMatcher;
use crate::routing::router::RESERVED_PREFIXES;

/// A validated backend route.
#[derive(Debug, Clone)]
pub struct RouteDescriptor {
    name: String,
    matcher: PathPrefixMatcher,
    target: Url,
    strip_prefix: bool,
    timeout: Option<Duration>,
}

impl RouteDescriptor {
    fn from_config(config: &RouteConfig) -> Result<Self, Vec<ValidationError>> {
        let mut errors = Vec::new();

        let matcher = PathPrefixMatcher::new(&config.prefix);
        match &matcher {
            None => errors.push(ValidationError::InvalidPrefix {
                route: config.name.clone(),
                prefix: config.prefix.clone(),
            }),
            Some(m) if is_reserved(m.prefix()) => errors.push(ValidationError::ReservedPrefix {
                route: config.name.clone(),
                prefix: m.prefix().to_string(),
            }),
            Some(_) => {}
        }

        let target = match parse_target(config) {
            Ok(url) => Some(url),
            Err(e) => {
                errors.push(e);
                None
            }
        };

        if config.timeout_secs == Some(0) {
            errors.push(ValidationError::NonPositiveTimeout {
                route: config.name.clone(),
            });
        }

        match (matcher, target) {
            (Some(matcher), Some(target)) if errors.is_empty() => Ok(Self {
                name: config.name.clone(),
                matcher,
                target,
                strip_prefix: config.strip_prefix,
                timeout: config.timeout_secs.map(Duration::from_secs),
            }),
            _ => Err(errors),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Normalized prefix (leading '/', no trailing '/').
    pub fn prefix(&self) -> &str {
        self.matcher.prefix()
    }

    pub fn target(&self) -> &Url {
        &self.target
    }

    pub fn strip_prefix(&self) -> bool {
        self.strip_prefix
    }

    /// Per-route timeout override, if configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub(crate) fn matcher(&self) -> &PathPrefixMatcher {
        &self.matcher
    }

    /// Absolute backend URI for a rewritten path and the inbound query.
    pub fn target_uri(&self, path: &str, query: Option<&str>) -> Result<Uri, axum::http::Error> {
        let origin = &self.target[..url::Position::BeforePath];
        let base_path = self.target.path().trim_end_matches('/');
        let mut uri = format!("{}{}{}", origin, base_path, path);
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            uri.push('?');
            uri.push_str(query);
        }
        Ok(Uri::try_from(uri)?)
    }
}

fn parse_target(config: &RouteConfig) -> Result<Url, ValidationError> {
    let invalid = |reason: &str| ValidationError::InvalidTarget {
        route: config.name.clone(),
        url: config.target_url.clone(),
        reason: reason.to_string(),
    };

    let url = Url::parse(&config.target_url).map_err(|e| invalid(&e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ValidationError::UnsupportedScheme {
            route: config.name.clone(),
            scheme: url.scheme().to_string(),
        });
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(invalid("missing host"));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid("query and fragment are not allowed"));
    }
    Ok(url)
}

fn is_reserved(prefix: &str) -> bool {
    RESERVED_PREFIXES.iter().any(|reserved| {
        PathPrefixMatcher::new(reserved).is_some_and(|m| m.matches(prefix))
    })
}

/// Immutable mapping of URL prefix → backend descriptor.
#[derive(Debug, Default)]
pub struct RouteTable {
    /// Descriptors in configuration order.
    routes: Vec<Arc<RouteDescriptor>>,
    /// Same descriptors, longest prefix first.
    lookup: Vec<Arc<RouteDescriptor>>,
}

impl RouteTable {
    /// Validate route configs and build the table.
    pub fn load(configs: &[RouteConfig]) -> Result<Self, ConfigError> {
        let mut errors = Vec::new();
        let mut routes = Vec::with_capacity(configs.len());
        let mut names = HashSet::new();
        let mut prefixes: HashMap<String, &str> = HashMap::new();

        for config in configs {
            if !names.insert(config.name.as_str()) {
                errors.push(ValidationError::DuplicateName(config.name.clone()));
            }

            match RouteDescriptor::from_config(config) {
                Ok(route) => {
                    if let Some(first) = prefixes.insert(route.prefix().to_string(), &config.name)
                    {
                        errors.push(ValidationError::DuplicatePrefix {
                            prefix: route.prefix().to_string(),
                            first: first.to_string(),
                            second: config.name.clone(),
                        });
                    }
                    routes.push(Arc::new(route));
                }
                Err(route_errors) => errors.extend(route_errors),
            }
        }

        if !errors.is_empty() {
            return Err(ConfigError::Validation(errors));
        }

        let mut lookup = routes.clone();
        lookup.sort_by(|a, b| b.prefix().len().cmp(&a.prefix().len()));

        Ok(Self { routes, lookup })
    }

    /// Descriptors in configuration order.
    pub fn routes(&self) -> &[Arc<RouteDescriptor>] {
        &self.routes
    }

    pub(crate) fn by_longest_prefix(&self) -> impl Iterator<Item = &Arc<RouteDescriptor>> {
        self.lookup.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
