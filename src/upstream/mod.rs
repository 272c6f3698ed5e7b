//! Upstream forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! UpstreamCall (method, path + query, optional body)
//!     → client.rs (auth + locale/store headers, one HTTP round trip)
//!     → types.rs (parse body, classify status)
//!     → Ok(UpstreamResponse) | Err(GatewayError)
//! ```
//!
//! # Design Decisions
//! - No retries, no backoff: one call per inbound request
//! - Non-JSON bodies are kept as strings, never an error on their own
//! - The bearer token is never logged

pub mod client;
pub mod types;

pub use client::UpstreamClient;
pub use types::{UpstreamCall, UpstreamResponse, X_PRINTFUL_STATUS};
