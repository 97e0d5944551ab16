//! Gateway-owned status endpoints.
//!
//! ```text
//! GET /api/gateway/status   → GatewayStatus
//! GET /api/gateway/services → [ServiceInfo]
//! ```

pub mod handlers;

pub use handlers::{gateway_status, list_services, GatewayStatus, ServiceInfo};
