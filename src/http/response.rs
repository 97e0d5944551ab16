//! Response handling and transformation.
//!
//! # Responsibilities
//! - Transform backend response for client
//! - Render local (gateway-owned) JSON responses
//! - Stamp X-Request-Id on every response
//!
//! # Design Decisions
//! - Streaming responses avoid buffering entire body
//! - Backend status codes pass through unchanged
//! - Hop-by-hop headers stripped automatically

use axum::body::Body;
use axum::http::Response;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::http::request::{RequestId, X_REQUEST_ID};
use crate::security::headers::client_headers;

/// Re-head a backend response for the client; the body keeps streaming.
pub fn from_backend(backend: Response<Body>, request_id: &RequestId) -> Response<Body> {
    let (mut parts, body) = backend.into_parts();
    parts.headers = client_headers(&parts.headers, request_id);
    Response::from_parts(parts, body)
}

/// JSON response for a gateway-owned endpoint.
pub fn local_json<T: Serialize>(value: &T) -> Response<Body> {
    Json(value).into_response()
}

/// Ensure the correlation header is present (local and error responses).
pub fn stamp_request_id(response: &mut Response<Body>, request_id: &RequestId) {
    response
        .headers_mut()
        .insert(X_REQUEST_ID, request_id.header_value());
}
