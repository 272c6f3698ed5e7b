//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path, query)
//!     → matcher.rs (category, endpoint shape, numeric id)
//!     → router.rs (verb check, upstream path translation)
//!     → Return: RouteMatch or GatewayError (404 / 405)
//! ```
//!
//! # Design Decisions
//! - Route table is fixed at compile time, immutable at runtime
//! - No regex in hot path (segment matching only)
//! - Deterministic: same input always matches same route
//! - First match wins

pub mod matcher;
pub mod router;

pub use matcher::{Endpoint, RouteCategory};
pub use router::{Dispatch, RouteMatch, Router};
