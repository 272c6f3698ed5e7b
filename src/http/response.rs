//! Response handling and the gateway error envelope.
//!
//! # Responsibilities
//! - Build JSON responses with the mandatory `Content-Type`
//! - Define the error taxonomy surfaced to callers
//! - Map every error to a status code and an `{"error": {...}}` body
//!
//! # Design Decisions
//! - Upstream error bodies are relayed verbatim in `details` (no sanitization)
//! - Upstream error status codes pass through unchanged
//! - Transport failures become 502 Bad Gateway

use axum::{
    body::Body,
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::routing::RouteCategory;

/// Fallback message when an upstream error body names no reason.
pub const UNKNOWN_UPSTREAM_ERROR: &str = "Unknown error from the Printful API";

/// Current time as an ISO-8601 UTC string with millisecond precision.
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Standardized error body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorEnvelope {
    pub code: String,
    pub title: String,
    pub message: String,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a ErrorEnvelope,
}

/// Every failure the gateway can report to a caller.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// `PRINTFUL_API_KEY` is missing or empty.
    #[error("Set PRINTFUL_API_KEY in the gateway environment")]
    Configuration,

    /// No route category matched the path.
    #[error("The endpoint {path} is not available")]
    EndpointNotFound { path: String },

    /// The category is known but the path shape is not (e.g. non-numeric id).
    #[error("Could not process {path} with method {method}")]
    InvalidRoute {
        category: RouteCategory,
        path: String,
        method: Method,
    },

    /// The path shape is known but the verb is not supported on it.
    #[error("Method {method} is not allowed on {path}")]
    MethodNotAllowed {
        category: RouteCategory,
        path: String,
        method: Method,
        allow: &'static str,
    },

    /// Upstream answered with a non-success status.
    #[error("{message}")]
    Upstream {
        status: StatusCode,
        message: String,
        details: Value,
    },

    /// Upstream could not be reached or its response could not be read.
    #[error("Could not connect to the Printful API: {0}")]
    Connection(String),

    /// The inbound body could not be read.
    #[error("Could not read request body: {0}")]
    InvalidBody(String),

    /// A client exhausted its token bucket.
    #[error("Too many requests, retry in {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Anything else that escaped normal handling.
    #[error("{0}")]
    Internal(String),
}

impl GatewayError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Configuration | GatewayError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            GatewayError::EndpointNotFound { .. } | GatewayError::InvalidRoute { .. } => {
                StatusCode::NOT_FOUND
            }
            GatewayError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            GatewayError::Upstream { status, .. } => *status,
            GatewayError::Connection(_) => StatusCode::BAD_GATEWAY,
            GatewayError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            GatewayError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    /// Machine-readable error code.
    pub fn code(&self) -> String {
        match self {
            GatewayError::Configuration => "CONFIGURATION_ERROR".into(),
            GatewayError::EndpointNotFound { .. } => "ENDPOINT_NOT_FOUND".into(),
            GatewayError::InvalidRoute { category, .. } => {
                format!("{}_INVALID_ROUTE", category.code_prefix())
            }
            GatewayError::MethodNotAllowed { category, .. } => {
                format!("{}_METHOD_NOT_ALLOWED", category.code_prefix())
            }
            GatewayError::Upstream { .. } => "PRINTFUL_API_ERROR".into(),
            GatewayError::Connection(_) => "PRINTFUL_CONNECTION_ERROR".into(),
            GatewayError::InvalidBody(_) => "INVALID_REQUEST_BODY".into(),
            GatewayError::RateLimited { .. } => "RATE_LIMITED".into(),
            GatewayError::Internal(_) => "INTERNAL_SERVER_ERROR".into(),
        }
    }

    /// Human-readable summary.
    pub fn title(&self) -> String {
        match self {
            GatewayError::Configuration => "API key not configured".into(),
            GatewayError::EndpointNotFound { .. } => "Endpoint not found".into(),
            GatewayError::InvalidRoute { category, .. } => {
                format!("Invalid {} route", category.as_str())
            }
            GatewayError::MethodNotAllowed { category, .. } => {
                format!("Method not allowed on {}", category.as_str())
            }
            GatewayError::Upstream { status, .. } => {
                format!("Printful API error ({})", status.as_u16())
            }
            GatewayError::Connection(_) => "Printful connection error".into(),
            GatewayError::InvalidBody(_) => "Invalid request body".into(),
            GatewayError::RateLimited { .. } => "Rate limit exceeded".into(),
            GatewayError::Internal(_) => "Internal server error".into(),
        }
    }

    /// Snapshot this error as an envelope stamped with the current time.
    pub fn envelope(&self) -> ErrorEnvelope {
        let details = match self {
            GatewayError::Upstream { details, .. } => Some(details.clone()),
            _ => None,
        };
        ErrorEnvelope {
            code: self.code(),
            title: self.title(),
            message: self.to_string(),
            timestamp: timestamp(),
            details,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let envelope = self.envelope();
        let body = serde_json::to_string(&ErrorBody { error: &envelope })
            .unwrap_or_else(|_| String::from(r#"{"error":{"code":"INTERNAL_SERVER_ERROR"}}"#));

        let mut response = json_response(self.status(), body);
        match &self {
            GatewayError::MethodNotAllowed { allow, .. } => {
                response
                    .headers_mut()
                    .insert(header::ALLOW, HeaderValue::from_static(*allow));
            }
            GatewayError::RateLimited { retry_after_secs } => {
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from(*retry_after_secs));
            }
            _ => {}
        }
        response
    }
}

/// Build a response with a pre-serialized JSON body.
pub fn json_response(status: StatusCode, body: impl Into<Body>) -> Response {
    let mut response = Response::new(body.into());
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response
}

/// Pick the human-readable message out of an upstream error body.
///
/// Precedence: a non-empty `error` string, then `error.message` (Printful's
/// object-shaped errors), then a non-empty `message` string, then the raw
/// text of a non-JSON body, then a fixed fallback.
pub fn upstream_error_message(body: &Value) -> String {
    fn non_empty(value: Option<&Value>) -> Option<&str> {
        value.and_then(Value::as_str).map(str::trim).filter(|s| !s.is_empty())
    }

    let found = match body {
        Value::Object(map) => non_empty(map.get("error"))
            .or_else(|| non_empty(map.get("error").and_then(|e| e.get("message"))))
            .or_else(|| non_empty(map.get("message"))),
        Value::String(text) => Some(text.trim()).filter(|s| !s.is_empty()),
        _ => None,
    };

    found.unwrap_or(UNKNOWN_UPSTREAM_ERROR).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_error_message_precedence() {
        assert_eq!(
            upstream_error_message(&json!({"error": "Invalid variant_id", "message": "ignored"})),
            "Invalid variant_id"
        );
        assert_eq!(
            upstream_error_message(&json!({"error": "", "message": "Order not found"})),
            "Order not found"
        );
        assert_eq!(
            upstream_error_message(&json!({
                "code": 404,
                "error": {"reason": "NotFound", "message": "Not found"}
            })),
            "Not found"
        );
        assert_eq!(upstream_error_message(&json!("Bad Gateway")), "Bad Gateway");
        assert_eq!(upstream_error_message(&json!({"code": 500})), UNKNOWN_UPSTREAM_ERROR);
        assert_eq!(upstream_error_message(&json!([1, 2])), UNKNOWN_UPSTREAM_ERROR);
    }

    #[test]
    fn test_codes_and_statuses() {
        let err = GatewayError::InvalidRoute {
            category: RouteCategory::Orders,
            path: "/api/orders/abc".into(),
            method: Method::GET,
        };
        assert_eq!(err.code(), "ORDERS_INVALID_ROUTE");
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err = GatewayError::MethodNotAllowed {
            category: RouteCategory::Webhooks,
            path: "/api/webhooks".into(),
            method: Method::PUT,
            allow: "GET, POST, DELETE",
        };
        assert_eq!(err.code(), "WEBHOOKS_METHOD_NOT_ALLOWED");
        assert_eq!(err.status(), StatusCode::METHOD_NOT_ALLOWED);

        assert_eq!(GatewayError::Configuration.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(GatewayError::Connection("reset".into()).status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_upstream_error_envelope() {
        let err = GatewayError::Upstream {
            status: StatusCode::BAD_REQUEST,
            message: "Invalid variant_id".into(),
            details: json!({"error": "Invalid variant_id"}),
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");

        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "PRINTFUL_API_ERROR");
        assert_eq!(body["error"]["title"], "Printful API error (400)");
        assert_eq!(body["error"]["message"], "Invalid variant_id");
        assert_eq!(body["error"]["details"], json!({"error": "Invalid variant_id"}));
        assert!(body["error"]["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[tokio::test]
    async fn test_envelope_omits_empty_details() {
        let body = body_json(GatewayError::Configuration.into_response()).await;
        assert_eq!(body["error"]["code"], "CONFIGURATION_ERROR");
        assert!(body["error"].get("details").is_none());
    }

    #[test]
    fn test_method_not_allowed_sets_allow() {
        let response = GatewayError::MethodNotAllowed {
            category: RouteCategory::Stores,
            path: "/api/stores".into(),
            method: Method::POST,
            allow: "GET",
        }
        .into_response();
        assert_eq!(response.headers()[header::ALLOW], "GET");
    }

    #[test]
    fn test_rate_limited_sets_retry_after() {
        let response = GatewayError::RateLimited { retry_after_secs: 3 }.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "3");
    }
}
