//! Outbound network layer.
//!
//! # Data Flow
//! ```text
//! Forwarder (pooled hyper client)
//!     → connector.rs (records whether the backend has started answering)
//!     → hyper-rustls (TLS for https targets, plain TCP otherwise)
//!     → HttpConnector (DNS, connect timeout, TCP_NODELAY)
//! ```
//!
//! # Design Decisions
//! - Every connection carries an `ExchangeProgress` flag in its metadata so
//!   a failed call can tell "never answered" from "answered then broke off"
//! - TLS trusts the platform root store; nothing is pinned per route

pub mod connector;
pub mod tls;

pub use connector::{BackendConnector, ExchangeProgress, TrackedIo, TrackingConnector};
