//! Header forwarding policy.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers in both directions
//! - Add X-Forwarded-For, X-Forwarded-Proto, X-Forwarded-Host
//! - Stamp X-Request-Id on outbound requests and client responses
//!
//! # Design Decisions
//! - Pure functions: HeaderMap in, HeaderMap out
//! - Duplicate header values are preserved in order
//! - Names listed in the inbound `Connection` header are also hop-by-hop
//! - Client-supplied X-Request-Id is replaced, never trusted
//! - Host is not forwarded; the outbound client sets it from the target URI

use std::collections::HashSet;
use std::net::IpAddr;

use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};

use crate::http::request::RequestId;

pub const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");
pub const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");
pub const X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");

/// RFC 7230 hop-by-hop header names (lowercase).
pub const HOP_BY_HOP_HEADERS: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Check if a header is a hop-by-hop header that should not be forwarded.
pub fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP_HEADERS.contains(&name.as_str())
}

/// Facts about the inbound connection needed to build forwarding headers.
#[derive(Debug, Clone)]
pub struct ForwardingInfo<'a> {
    /// Peer address of the client, if known.
    pub client_ip: Option<IpAddr>,
    /// Scheme the client used to reach the gateway.
    pub scheme: &'a str,
    /// Host the client addressed.
    pub host: &'a str,
    pub request_id: &'a RequestId,
}

/// Build the header set sent to the backend.
pub fn outbound_headers(inbound: &HeaderMap, info: &ForwardingInfo<'_>) -> HeaderMap {
    let listed = connection_tokens(inbound);
    let mut out = HeaderMap::with_capacity(inbound.len() + 4);

    for (name, value) in inbound {
        if is_hop_by_hop(name)
            || listed.contains(name.as_str())
            || name == header::HOST
            || name == crate::http::request::X_REQUEST_ID
            || name == X_FORWARDED_FOR
        {
            continue;
        }
        out.append(name.clone(), value.clone());
    }

    let client = info
        .client_ip
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let mut chain: Vec<&str> = inbound
        .get_all(&X_FORWARDED_FOR)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .collect();
    chain.push(&client);
    let forwarded_for = HeaderValue::from_str(&chain.join(", "))
        .or_else(|_| HeaderValue::from_str(&client))
        .unwrap_or_else(|_| HeaderValue::from_static("unknown"));
    out.insert(X_FORWARDED_FOR, forwarded_for);

    if let Ok(proto) = HeaderValue::from_str(info.scheme) {
        out.insert(X_FORWARDED_PROTO, proto);
    }

    if !out.contains_key(&X_FORWARDED_HOST) {
        if let Ok(host) = HeaderValue::from_str(info.host) {
            out.insert(X_FORWARDED_HOST, host);
        }
    }

    out.insert(
        crate::http::request::X_REQUEST_ID,
        info.request_id.header_value(),
    );
    out
}

/// Build the header set returned to the client from a backend response.
pub fn client_headers(backend: &HeaderMap, request_id: &RequestId) -> HeaderMap {
    let listed = connection_tokens(backend);
    let mut out = HeaderMap::with_capacity(backend.len() + 1);

    for (name, value) in backend {
        if is_hop_by_hop(name) || listed.contains(name.as_str()) {
            continue;
        }
        out.append(name.clone(), value.clone());
    }

    out.insert(crate::http::request::X_REQUEST_ID, request_id.header_value());
    out
}

/// Header names listed in `Connection` (lowercased).
fn connection_tokens(headers: &HeaderMap) -> HashSet<String> {
    headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|token| token.trim().to_ascii_lowercase())
        .filter(|token| !token.is_empty())
        .collect()
}
