//! Top-level request handler.
//!
//! # Data Flow
//! ```text
//! Received ──(body too large)──────────────────────┐
//!    │                                             │
//! Routed ──(no match)──────────────────────────────┤
//!    │  └─(gateway endpoint)→ local JSON ──┐       │
//!    │                                     │       ▼
//! Forwarding ──(transport failure)─────────┼──→ Errored
//!    │                                     │       │
//!    ▼                                     ▼       ▼
//! Responding (stamp X-Request-Id, log once, record metrics) → Done
//! ```
//!
//! # Design Decisions
//! - Exactly one log record per request, emitted in `respond`
//! - Errors are values flowing into `respond`, not early returns that bypass logging
//! - The route table is snapshotted once per request; a reload mid-request
//!   does not change where that request goes

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::request::Parts;
use axum::http::Response;
use axum::response::IntoResponse;

use crate::admin::{gateway_status, list_services};
use crate::health::health_check;
use crate::http::error::GatewayError;
use crate::http::forwarder::OutboundRequest;
use crate::http::request::{GatewayRequestContext, Phase};
use crate::http::response::{from_backend, local_json, stamp_request_id};
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::resilience::Deadline;
use crate::routing::{resolve, GatewayEndpoint, Resolution, RouteTable};
use crate::security::headers::{outbound_headers, ForwardingInfo};
use crate::security::limits;

/// How a request left the pipeline.
enum Outcome {
    /// Answered by a gateway-owned endpoint.
    Local(Response<Body>),
    /// Backend response, status untouched.
    Proxied(Response<Body>),
    Errored(GatewayError),
}

/// Entry point for every inbound request.
pub async fn gateway_handler(State(state): State<AppState>, request: Request) -> Response<Body> {
    let client_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let (parts, body) = request.into_parts();
    let mut ctx = GatewayRequestContext::new(&parts, client_addr, &state.settings.public_host);

    let outcome = process(&state, &mut ctx, parts, body).await;
    respond(&mut ctx, outcome)
}

async fn process(
    state: &AppState,
    ctx: &mut GatewayRequestContext,
    parts: Parts,
    body: Body,
) -> Outcome {
    let max_body_size = state.settings.max_body_size;
    if let Err(declared) = limits::check_content_length(&parts.headers, max_body_size) {
        tracing::debug!(
            request_id = %ctx.request_id,
            declared,
            max_body_size,
            "Rejecting oversized request body"
        );
        return Outcome::Errored(GatewayError::payload_too_large(&ctx.path, max_body_size));
    }

    let table = state.routes.load_full();
    let matched = match resolve(&table, &ctx.method, &ctx.path) {
        Resolution::Gateway(endpoint) => {
            ctx.advance(Phase::Routed);
            return Outcome::Local(local_endpoint(endpoint, &table));
        }
        Resolution::NoMatch => return Outcome::Errored(GatewayError::not_found(&ctx.path)),
        Resolution::Backend(matched) => matched,
    };
    ctx.route = Some(Arc::clone(&matched.route));
    ctx.advance(Phase::Routed);

    let route = matched.route;
    let uri = match route.target_uri(&matched.rewritten_path, ctx.query.as_deref()) {
        Ok(uri) => uri,
        Err(e) => {
            return Outcome::Errored(GatewayError::bad_gateway(
                route.name(),
                &e.to_string(),
                &ctx.path,
            ))
        }
    };
    ctx.target_url = Some(uri.clone());

    let info = ForwardingInfo {
        client_ip: ctx.client_addr.map(|addr| addr.ip()),
        scheme: parts.uri.scheme_str().unwrap_or("http"),
        host: &ctx.host,
        request_id: &ctx.request_id,
    };
    let outbound = OutboundRequest {
        method: ctx.method.clone(),
        uri,
        headers: outbound_headers(&parts.headers, &info),
        body: limits::limit_body(body, max_body_size),
    };
    let deadline = Deadline::after(route.timeout().unwrap_or(state.settings.default_timeout));

    ctx.advance(Phase::Forwarding);
    match state.forwarder.forward(outbound, deadline).await {
        Ok(response) => Outcome::Proxied(from_backend(response, &ctx.request_id)),
        Err(e) => {
            tracing::debug!(
                request_id = %ctx.request_id,
                route = route.name(),
                error = %e,
                "Forwarding failed"
            );
            Outcome::Errored(GatewayError::from_forward(
                &e,
                route.name(),
                &ctx.path,
                max_body_size,
            ))
        }
    }
}

fn local_endpoint(endpoint: GatewayEndpoint, table: &RouteTable) -> Response<Body> {
    match endpoint {
        GatewayEndpoint::Health => local_json(&health_check()),
        GatewayEndpoint::Status => local_json(&gateway_status(table)),
        GatewayEndpoint::Services => local_json(&list_services(table)),
    }
}

/// Write the response and emit the request's single log record.
fn respond(ctx: &mut GatewayRequestContext, outcome: Outcome) -> Response<Body> {
    let failed_in = ctx.phase;
    ctx.advance(Phase::Responding);

    let (mut response, error) = match outcome {
        Outcome::Local(response) | Outcome::Proxied(response) => (response, None),
        Outcome::Errored(err) => {
            let code = err.error;
            (err.into_response(), Some(code))
        }
    };
    stamp_request_id(&mut response, &ctx.request_id);

    let status = response.status().as_u16();
    let target_url = ctx
        .target_url
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_default();
    let client_ip = ctx
        .client_addr
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let duration_ms = ctx.elapsed_ms();
    let received_at = ctx.received_at.to_rfc3339();

    match error {
        None => tracing::info!(
            request_id = %ctx.request_id,
            method = %ctx.method,
            path = %ctx.path,
            route = ctx.route_name(),
            target_url = %target_url,
            status,
            duration_ms,
            client_ip = %client_ip,
            received_at = %received_at,
            "Request completed"
        ),
        Some(code) => tracing::warn!(
            request_id = %ctx.request_id,
            method = %ctx.method,
            path = %ctx.path,
            route = ctx.route_name(),
            target_url = %target_url,
            status,
            duration_ms,
            client_ip = %client_ip,
            received_at = %received_at,
            error = code.as_str(),
            phase = failed_in.as_str(),
            "Request failed"
        ),
    }
    metrics::record_request(ctx.method.as_str(), status, ctx.route_name(), ctx.started);

    ctx.advance(Phase::Done);
    response
}
