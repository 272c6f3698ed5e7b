//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request (after the API-key check):
//!     → rate_limit.rs (per-client, per-sensitivity token buckets)
//!     → Pass to routing
//! ```
//!
//! # Design Decisions
//! - Fail closed: an exhausted bucket rejects with 429
//! - Writes get a smaller budget than reads
//! - Disabled by default; no placeholder hook when off

pub mod rate_limit;

pub use rate_limit::{RateLimiter, Sensitivity};
