//! Request hygiene subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → limits.rs (declared body size, streaming body limit)
//!     → headers.rs (strip hop-by-hop, add X-Forwarded-*)
//!     → Forward to backend
//!
//! Backend response
//!     → headers.rs (strip hop-by-hop, add X-Request-Id)
//!     → Client
//! ```

pub mod headers;
pub mod limits;
