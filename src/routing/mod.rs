//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path)
//!     → router.rs (reserved gateway endpoints first)
//!     → router.rs (longest-prefix lookup)
//!     → matcher.rs (segment-aligned prefix test, strip)
//!     → Return: Gateway endpoint, RouteMatch, or NoMatch
//!
//! Route Compilation (at startup / reload):
//!     RouteConfig[]
//!     → table.rs (validate, normalize)
//!     → Sort by prefix length
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same input always matches same route
//! - Longest prefix wins

pub mod matcher;
pub mod router;
pub mod table;

pub use router::{resolve, GatewayEndpoint, Resolution, RouteMatch};
pub use table::{RouteDescriptor, RouteTable};
