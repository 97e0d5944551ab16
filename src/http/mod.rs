//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, shared state, reload, shutdown)
//!     → handler.rs (per-request state machine)
//!     → request.rs (request ID, per-request context)
//!     → [routing layer resolves route or local endpoint]
//!     → forwarder.rs (pooled backend call under one deadline)
//!     → response.rs (client headers, X-Request-Id)
//!     → error.rs (gateway-generated failures as JSON)
//!     → Send to client
//! ```

pub mod error;
pub mod forwarder;
pub mod handler;
pub mod request;
pub mod response;
pub mod server;

pub use error::{ErrorCode, GatewayError};
pub use forwarder::{ClientError, ForwardError, Forwarder, OutboundRequest};
pub use handler::gateway_handler;
pub use request::{GatewayRequestContext, Phase, RequestId, X_REQUEST_ID};
pub use server::{AppState, GatewayServer, GatewaySettings};
