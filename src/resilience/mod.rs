//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request arrives
//!     → timeouts.rs (Deadline from route timeout or gateway default)
//!     → connect + send + response headers bounded by the deadline
//!     → response body wrapped in DeadlineBody
//! ```
//!
//! # Design Decisions
//! - No retries on the proxy path: a retry could duplicate non-idempotent
//!   backend side effects
//! - Deadline expiry at any stage surfaces as 504 Gateway Timeout

pub mod timeouts;

pub use timeouts::{Deadline, DeadlineBody, DeadlineExceeded};
