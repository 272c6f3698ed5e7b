//! Printful API gateway library.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod payloads;
pub mod routing;
pub mod security;
pub mod upstream;

pub use config::schema::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
