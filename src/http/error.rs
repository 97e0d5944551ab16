//! Gateway error responses.
//!
//! Every error the gateway generates itself is one of five codes, each
//! tied to exactly one HTTP status, and is rendered as
//! `{error, message, path, timestamp, status_code}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::http::forwarder::ForwardError;

/// Error codes for gateway-generated errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    NotFound,
    PayloadTooLarge,
    BadGateway,
    ServiceUnavailable,
    GatewayTimeout,
}

impl ErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ErrorCode::BadGateway => StatusCode::BAD_GATEWAY,
            ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::GatewayTimeout => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::NotFound => "not_found",
            ErrorCode::PayloadTooLarge => "payload_too_large",
            ErrorCode::BadGateway => "bad_gateway",
            ErrorCode::ServiceUnavailable => "service_unavailable",
            ErrorCode::GatewayTimeout => "gateway_timeout",
        }
    }
}

/// Standard error body for gateway-generated errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayError {
    pub error: ErrorCode,
    pub message: String,
    pub path: String,
    pub timestamp: DateTime<Utc>,
    pub status_code: u16,
}

impl GatewayError {
    fn new(code: ErrorCode, message: String, path: &str) -> Self {
        Self {
            error: code,
            message,
            path: path.to_string(),
            timestamp: Utc::now(),
            status_code: code.status().as_u16(),
        }
    }

    pub fn not_found(path: &str) -> Self {
        Self::new(
            ErrorCode::NotFound,
            format!("No route found for path: {}", path),
            path,
        )
    }

    pub fn payload_too_large(path: &str, max_body_size: u64) -> Self {
        Self::new(
            ErrorCode::PayloadTooLarge,
            format!(
                "Request body exceeds maximum size of {} bytes",
                max_body_size
            ),
            path,
        )
    }

    pub fn bad_gateway(route: &str, detail: &str, path: &str) -> Self {
        Self::new(
            ErrorCode::BadGateway,
            format!("Error forwarding request to '{}': {}", route, detail),
            path,
        )
    }

    /// Map a forwarding failure for `route` onto its gateway error.
    pub fn from_forward(err: &ForwardError, route: &str, path: &str, max_body_size: u64) -> Self {
        match err {
            ForwardError::Unreachable(_) => Self::new(
                ErrorCode::ServiceUnavailable,
                format!("Backend service '{}' is not responding", route),
                path,
            ),
            ForwardError::TimedOut(budget) => Self::new(
                ErrorCode::GatewayTimeout,
                format!("Request to '{}' timed out after {:?}", route, budget),
                path,
            ),
            ForwardError::Malformed(detail) => Self::bad_gateway(route, detail, path),
            ForwardError::PayloadTooLarge => Self::payload_too_large(path, max_body_size),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.error.status()
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}
