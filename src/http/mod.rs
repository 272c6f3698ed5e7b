//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, client identity)
//!     → middleware/cors.rs (preflight short-circuit)
//!     → server.rs handler (API key, rate limit, routing, forward)
//!     → local.rs (health / info) or upstream forwarder
//!     → response.rs (success relay or error envelope)
//!     → middleware/timing.rs (X-Response-Time, X-Gateway-Version)
//!     → Send to client
//! ```

pub mod local;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use response::{ErrorEnvelope, GatewayError};
pub use server::{HttpServer, ServerError};
