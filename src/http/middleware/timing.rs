//! Response metadata middleware.
//! Adds timing and version headers after core processing and records request metrics.

use std::time::Instant;

use axum::{
    body::Body,
    http::{header, HeaderValue, Request},
    middleware::Next,
    response::Response,
};

use crate::observability::metrics;

/// Milliseconds spent inside the gateway, e.g. `12ms`.
pub const X_RESPONSE_TIME: &str = "x-response-time";
/// Gateway version.
pub const X_GATEWAY_VERSION: &str = "x-gateway-version";

pub async fn timing_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();

    let mut response = next.run(request).await;

    let elapsed_ms = start.elapsed().as_millis();
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&format!("{}ms", elapsed_ms)) {
        headers.insert(X_RESPONSE_TIME, value);
    }
    headers.insert(
        X_GATEWAY_VERSION,
        HeaderValue::from_static(env!("CARGO_PKG_VERSION")),
    );
    headers
        .entry(header::CONTENT_TYPE)
        .or_insert(HeaderValue::from_static("application/json"));

    metrics::record_request(method.as_str(), response.status().as_u16(), start);
    response
}
