//! Request body limits.
//!
//! # Responsibilities
//! - Enforce maximum request body size
//! - Reject oversized declared bodies before routing
//! - Bound undeclared (chunked) bodies while streaming
//!
//! # Design Decisions
//! - Limits checked before routing (early rejection, no wasted backend connection)
//! - Streaming bodies are never buffered; the limit trips mid-stream instead
//! - Return 413 Payload Too Large

use std::error::Error as StdError;

use axum::body::Body;
use axum::http::{header, HeaderMap};
use http_body_util::{LengthLimitError, Limited};

/// Check the declared `Content-Length` against `max`.
///
/// Returns the declared length as the error when it exceeds the limit.
/// A missing or unparseable header passes; the streaming limit covers it.
pub fn check_content_length(headers: &HeaderMap, max: u64) -> Result<(), u64> {
    let declared = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok());

    match declared {
        Some(len) if len > max => Err(len),
        _ => Ok(()),
    }
}

/// Wrap a request body so reading more than `max` bytes fails.
pub fn limit_body(body: Body, max: u64) -> Body {
    let max = usize::try_from(max).unwrap_or(usize::MAX);
    Body::new(Limited::new(body, max))
}

/// True if `err` or anything in its source chain is a body length violation.
pub fn is_limit_error(err: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if e.is::<LengthLimitError>() {
            return true;
        }
        current = e.source();
    }
    false
}
