//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate unique request ID (UUID v4) for every inbound request
//! - Capture per-request context (method, path, query, client, timing)
//! - Track the request's progress through the gateway state machine
//!
//! # Design Decisions
//! - Request ID generated as early as possible, never taken from the client
//! - Context lives exactly as long as the request
//! - Headers and body stay in the request parts so the body is read lazily

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::http::header::{self, HeaderName, HeaderValue};
use axum::http::request::Parts;
use axum::http::{Method, Uri};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::routing::RouteDescriptor;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Correlation id joining a response with its log record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(String);

impl RequestId {
    /// Generate a new random request ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn header_value(&self) -> HeaderValue {
        HeaderValue::from_str(&self.0).unwrap_or_else(|_| HeaderValue::from_static("invalid"))
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stages of a request inside the gateway.
///
/// ```text
/// Received → Routed → Forwarding → Responding → Done
///     │         │          │
///     └─────────┴──────────┴──→ Errored (rejoins Responding)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Received,
    Routed,
    Forwarding,
    Responding,
    Done,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Received => "received",
            Phase::Routed => "routed",
            Phase::Forwarding => "forwarding",
            Phase::Responding => "responding",
            Phase::Done => "done",
        }
    }
}

/// Per-request state, created on arrival and dropped once the response is written.
#[derive(Debug)]
pub struct GatewayRequestContext {
    pub request_id: RequestId,
    pub method: Method,
    /// Original request path.
    pub path: String,
    pub query: Option<String>,
    pub client_addr: Option<SocketAddr>,
    /// Host the client addressed (Host header, URI authority, or listener address).
    pub host: String,
    pub received_at: DateTime<Utc>,
    pub started: Instant,
    pub phase: Phase,
    pub route: Option<Arc<RouteDescriptor>>,
    pub target_url: Option<Uri>,
}

impl GatewayRequestContext {
    pub fn new(parts: &Parts, client_addr: Option<SocketAddr>, fallback_host: &str) -> Self {
        let host = parts
            .headers
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .or_else(|| parts.uri.authority().map(|a| a.to_string()))
            .unwrap_or_else(|| fallback_host.to_string());

        Self {
            request_id: RequestId::new(),
            method: parts.method.clone(),
            path: parts.uri.path().to_string(),
            query: parts.uri.query().map(str::to_string),
            client_addr,
            host,
            received_at: Utc::now(),
            started: Instant::now(),
            phase: Phase::Received,
            route: None,
            target_url: None,
        }
    }

    /// Move to the next phase.
    pub fn advance(&mut self, phase: Phase) {
        tracing::trace!(
            request_id = %self.request_id,
            from = self.phase.as_str(),
            to = phase.as_str(),
            "Request phase change"
        );
        self.phase = phase;
    }

    /// Name of the matched route, or "none".
    pub fn route_name(&self) -> &str {
        self.route.as_ref().map_or("none", |r| r.name())
    }

    pub fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}
