//! Endpoints answered by the gateway itself, never forwarded.

use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use serde::Serialize;

use crate::config::CatalogScope;
use crate::http::response::timestamp;
use crate::routing::Router;

const DOCUMENTATION_URL: &str = "https://developers.printful.com/docs/";

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub timestamp: String,
    pub version: &'static str,
    pub printful_api: &'static str,
    pub catalog_scope: CatalogScope,
}

#[derive(Debug, Serialize)]
pub struct ApiInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub description: &'static str,
    pub endpoints: Vec<&'static str>,
    pub documentation: &'static str,
    pub timestamp: String,
}

/// Health document: 200 when the API key is configured, 503 otherwise.
pub fn health(api_configured: bool, catalog_scope: CatalogScope) -> Response {
    let (status, report) = if api_configured {
        (StatusCode::OK, ("healthy", "configured"))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, ("unhealthy", "not_configured"))
    };

    let body = HealthReport {
        status: report.0,
        timestamp: timestamp(),
        version: env!("CARGO_PKG_VERSION"),
        printful_api: report.1,
        catalog_scope,
    };
    (status, Json(body)).into_response()
}

/// Static API description.
pub fn info(router: &Router) -> Response {
    Json(ApiInfo {
        name: "Printful API Proxy",
        version: env!("CARGO_PKG_VERSION"),
        description: "Gateway forwarding frontend requests to the Printful API",
        endpoints: router.describe(),
        documentation: DOCUMENTATION_URL,
        timestamp: timestamp(),
    })
    .into_response()
}
