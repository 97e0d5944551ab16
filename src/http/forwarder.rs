//! Outbound HTTP client for backend calls.
//!
//! # Responsibilities
//! - Send the rewritten request to the backend over a pooled connection
//! - Stream request and response bodies without buffering them
//! - Bound the whole exchange by the request deadline
//! - Translate transport failures into `ForwardError`
//!
//! # Design Decisions
//! - One shared `hyper_util` client; idle connections are pooled per host,
//!   so unrelated backends never contend on one lock
//! - Backend 4xx/5xx responses are data, not errors
//! - No retries: the caller owns retry policy
//! - Dropping the returned future (client went away) cancels the call and
//!   the half-used connection is discarded instead of returned to the pool
//! - A connection that closes before the backend sent a byte is
//!   unreachable; one that closes after a partial response is malformed
//! - The connect timeout is separate from the request deadline so a backend
//!   that never accepts fails fast instead of burning the whole budget

use std::error::Error as StdError;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Extensions, HeaderMap, Method, Request, Response, Uri, Version};
use hyper_rustls::HttpsConnectorBuilder;
use hyper_util::client::legacy::connect::{capture_connection, CaptureConnection, HttpConnector};
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use thiserror::Error;

use crate::config::{PoolConfig, TimeoutConfig};
use crate::net::{tls, BackendConnector, ExchangeProgress, TrackingConnector};
use crate::resilience::Deadline;
use crate::security::limits;

/// The outbound client could not be built.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid TLS client configuration: {0}")]
    Tls(#[from] rustls::Error),
}

/// Transport-level failure talking to a backend.
#[derive(Debug, Error)]
pub enum ForwardError {
    /// Connection refused, DNS failure, connect timeout, or a connection
    /// closed before the backend sent any byte.
    #[error("backend unreachable: {0}")]
    Unreachable(String),

    /// The request deadline passed before the response headers arrived.
    #[error("backend did not respond within {0:?}")]
    TimedOut(Duration),

    /// The backend answered with something that is not valid HTTP, or
    /// broke off in the middle of its response head.
    #[error("malformed backend response: {0}")]
    Malformed(String),

    /// The streamed request body exceeded the configured maximum.
    #[error("request body exceeds the configured limit")]
    PayloadTooLarge,
}

/// Request ready to be sent to a backend.
#[derive(Debug)]
pub struct OutboundRequest {
    pub method: Method,
    /// Absolute backend URI (target base URL + rewritten path + query).
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Body,
}

/// Pooled HTTP/1.1 client used for every forwarded request.
#[derive(Clone, Debug)]
pub struct Forwarder {
    client: Client<BackendConnector, Body>,
}

impl Forwarder {
    pub fn new(pool: &PoolConfig, timeouts: &TimeoutConfig) -> Result<Self, ClientError> {
        let mut http = HttpConnector::new();
        http.set_nodelay(true);
        http.enforce_http(false);
        http.set_connect_timeout(Some(Duration::from_secs(timeouts.connect_secs)));

        let https = HttpsConnectorBuilder::new()
            .with_tls_config(tls::client_config()?)
            .https_or_http()
            .enable_http1()
            .wrap_connector(http);

        let client = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(Duration::from_secs(timeouts.pool_idle_secs))
            .pool_max_idle_per_host(pool.max_idle_per_host)
            .build(TrackingConnector::new(https));

        Ok(Self { client })
    }

    /// Send `request` and return the backend response.
    ///
    /// The response body is still streaming when this returns and stays
    /// bound by `deadline`.
    pub async fn forward(
        &self,
        request: OutboundRequest,
        deadline: Deadline,
    ) -> Result<Response<Body>, ForwardError> {
        let mut outbound = Request::new(request.body);
        *outbound.method_mut() = request.method;
        *outbound.uri_mut() = request.uri;
        *outbound.version_mut() = Version::HTTP_11;
        *outbound.headers_mut() = request.headers;
        let connection = capture_connection(&mut outbound);

        let response = match deadline.run(self.client.request(outbound)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                return Err(classify(&e, deadline.budget(), response_started(&connection)))
            }
            Err(_) => return Err(ForwardError::TimedOut(deadline.budget())),
        };

        let (parts, body) = response.into_parts();
        let body = Body::new(deadline.bound_body(Body::new(body)));
        Ok(Response::from_parts(parts, body))
    }
}

/// Whether the backend had sent part of a response on the connection the
/// failed call used. False when no connection was established.
fn response_started(connection: &CaptureConnection) -> bool {
    let metadata = connection.connection_metadata();
    let Some(connected) = (*metadata).as_ref() else {
        return false;
    };
    let mut extras = Extensions::new();
    connected.get_extras(&mut extras);
    extras
        .get::<ExchangeProgress>()
        .is_some_and(ExchangeProgress::response_started)
}

/// Map a client error onto the gateway's failure classes.
fn classify(
    err: &hyper_util::client::legacy::Error,
    budget: Duration,
    response_started: bool,
) -> ForwardError {
    let detail = error_chain(err);
    let broken_off = |detail: String| {
        if response_started {
            ForwardError::Malformed(detail)
        } else {
            ForwardError::Unreachable(detail)
        }
    };

    if err.is_connect() {
        return ForwardError::Unreachable(detail);
    }
    if limits::is_limit_error(err) {
        return ForwardError::PayloadTooLarge;
    }
    if let Some(hyper_err) = find_source::<hyper::Error>(err) {
        if hyper_err.is_timeout() {
            return ForwardError::TimedOut(budget);
        }
        if hyper_err.is_incomplete_message() || hyper_err.is_canceled() || hyper_err.is_closed() {
            return broken_off(detail);
        }
        if hyper_err.is_parse() || hyper_err.is_parse_status() {
            return ForwardError::Malformed(detail);
        }
    }
    if let Some(io_err) = find_source::<std::io::Error>(err) {
        use std::io::ErrorKind;
        if matches!(
            io_err.kind(),
            ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted | ErrorKind::BrokenPipe
        ) {
            return broken_off(detail);
        }
    }
    ForwardError::Malformed(detail)
}

fn find_source<'a, T: StdError + 'static>(err: &'a (dyn StdError + 'static)) -> Option<&'a T> {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(found) = e.downcast_ref::<T>() {
            return Some(found);
        }
        current = e.source();
    }
    None
}

/// "outer: inner: root" rendering of an error and its sources.
fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut parts = vec![err.to_string()];
    let mut current = err.source();
    while let Some(e) = current {
        let text = e.to_string();
        if parts.last() != Some(&text) {
            parts.push(text);
        }
        current = e.source();
    }
    parts.join(": ")
}
