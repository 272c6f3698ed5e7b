//! Gateway middleware: CORS handling and response metadata.

pub mod cors;
pub mod timing;

pub use cors::{cors_middleware, CorsPolicy};
pub use timing::{timing_middleware, X_GATEWAY_VERSION, X_RESPONSE_TIME};
