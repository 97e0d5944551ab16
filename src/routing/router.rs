//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Resolve gateway-owned endpoints before backend routes
//! - Look up the longest segment-aligned prefix for a path
//! - Return matched route + rewritten path, or explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) prefix scan over a length-sorted list (acceptable for typical route counts)
//! - Explicit NoMatch rather than silent default

use std::sync::Arc;

use axum::http::Method;

use crate::routing::table::{RouteDescriptor, RouteTable};

pub const HEALTH_PATH: &str = "/health";
pub const STATUS_PATH: &str = "/api/gateway/status";
pub const SERVICES_PATH: &str = "/api/gateway/services";

/// Prefixes owned by the gateway itself; never forwarded.
pub const RESERVED_PREFIXES: [&str; 2] = [HEALTH_PATH, "/api/gateway"];

/// A backend route selected for a path.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub route: Arc<RouteDescriptor>,
    /// Path to send to the backend (prefix removed when `strip_prefix`).
    pub rewritten_path: String,
}

/// Endpoints answered locally by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayEndpoint {
    Health,
    Status,
    Services,
}

/// Outcome of routing one inbound request.
#[derive(Debug, Clone)]
pub enum Resolution {
    Gateway(GatewayEndpoint),
    Backend(RouteMatch),
    NoMatch,
}

impl RouteTable {
    /// Find the backend route with the longest prefix aligned to `path`.
    pub fn match_path(&self, path: &str) -> Option<RouteMatch> {
        let route = self.by_longest_prefix().find(|r| r.matcher().matches(path))?;
        let rewritten_path = if route.strip_prefix() {
            route.matcher().strip(path).to_string()
        } else {
            path.to_string()
        };
        Some(RouteMatch {
            route: Arc::clone(route),
            rewritten_path,
        })
    }
}

/// Resolve a request to a local endpoint, a backend route, or nothing.
///
/// Paths under a reserved prefix never reach the backend table; local
/// endpoints answer only GET and HEAD.
pub fn resolve(table: &RouteTable, method: &Method, path: &str) -> Resolution {
    if is_gateway_owned(path) {
        let endpoint = match path.trim_end_matches('/') {
            HEALTH_PATH => Some(GatewayEndpoint::Health),
            STATUS_PATH => Some(GatewayEndpoint::Status),
            SERVICES_PATH => Some(GatewayEndpoint::Services),
            _ => None,
        };
        return match endpoint {
            Some(endpoint) if *method == Method::GET || *method == Method::HEAD => {
                Resolution::Gateway(endpoint)
            }
            _ => Resolution::NoMatch,
        };
    }

    match table.match_path(path) {
        Some(matched) => Resolution::Backend(matched),
        None => Resolution::NoMatch,
    }
}

/// True for paths handled by the gateway without forwarding.
pub fn is_gateway_owned(path: &str) -> bool {
    RESERVED_PREFIXES.iter().any(|prefix| {
        path.strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    })
}
