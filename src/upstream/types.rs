//! Upstream call and response types.

use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::Response;
use bytes::Bytes;
use serde_json::Value;

use crate::http::response::{json_response, upstream_error_message, GatewayError};

/// Header echoing the real upstream status on successful forwards.
pub const X_PRINTFUL_STATUS: &str = "x-printful-status";

/// One outbound call to the Printful API.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamCall {
    pub method: Method,
    /// Path rooted at the upstream host, including any query string.
    pub path: String,
    pub body: Option<Bytes>,
}

impl UpstreamCall {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
        }
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Body to put on the wire: only state-changing verbs carry one.
    pub fn outbound_body(&self) -> Option<&Bytes> {
        match self.method {
            Method::POST | Method::PUT | Method::PATCH => self.body.as_ref(),
            _ => None,
        }
    }
}

/// A fully read upstream response.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    /// Body exactly as received.
    pub raw: String,
    /// Parsed body, or the raw text as a JSON string when it is not JSON.
    pub body: Value,
    is_json: bool,
}

impl UpstreamResponse {
    pub fn from_text(status: StatusCode, raw: String) -> Self {
        let (body, is_json) = match serde_json::from_str::<Value>(&raw) {
            Ok(value) => (value, true),
            Err(_) => (Value::String(raw.clone()), false),
        };
        Self {
            status,
            raw,
            body,
            is_json,
        }
    }

    pub fn is_json(&self) -> bool {
        self.is_json
    }

    /// Convert a non-success response into the gateway error it represents.
    pub fn into_error(self) -> GatewayError {
        GatewayError::Upstream {
            status: self.status,
            message: upstream_error_message(&self.body),
            details: self.body,
        }
    }

    /// Relay a successful response: status forced to 200, body untouched.
    pub fn into_response(self) -> Response {
        let upstream_status = self.status;
        let body = if self.is_json {
            self.raw
        } else {
            Value::String(self.raw).to_string()
        };

        let mut response = json_response(StatusCode::OK, body);
        response.headers_mut().insert(
            X_PRINTFUL_STATUS,
            HeaderValue::from(upstream_status.as_u16()),
        );
        response
    }
}
