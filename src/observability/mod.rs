//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Gateway handler produces, once per request:
//!     → logging.rs (structured log event carrying the request ID)
//!     → metrics.rs (request counter, latency histogram)
//!
//! Consumers:
//!     → Log aggregation (stdout, JSON lines)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Request ID flows through every log line for a request
//! - Metric macros are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
