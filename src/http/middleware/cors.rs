//! CORS middleware.
//! Answers preflight requests and stamps the CORS header set on every response.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Method, Request, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::config::CorsConfig;
use crate::http::response::json_response;

/// Immutable CORS header set, built once at startup and shared by all requests.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    headers: HeaderMap,
}

impl CorsPolicy {
    pub fn from_config(config: &CorsConfig) -> Result<Self, header::InvalidHeaderValue> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_str(&config.allow_origin)?,
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_str(&config.allow_methods)?,
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_str(&config.allow_headers)?,
        );
        headers.insert(
            header::ACCESS_CONTROL_MAX_AGE,
            HeaderValue::from(config.max_age_secs),
        );
        Ok(Self { headers })
    }

    /// Copy the CORS set onto outgoing headers.
    pub fn apply(&self, headers: &mut HeaderMap) {
        for (name, value) in &self.headers {
            headers.insert(name.clone(), value.clone());
        }
    }

    /// Empty 200 answer to an OPTIONS request.
    pub fn preflight(&self) -> Response {
        let mut response = json_response(StatusCode::OK, Body::empty());
        self.apply(response.headers_mut());
        response
    }
}

/// Short-circuit preflights before auth or routing; decorate everything else.
pub async fn cors_middleware(
    State(policy): State<Arc<CorsPolicy>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if request.method() == Method::OPTIONS {
        tracing::debug!(path = %request.uri().path(), "CORS preflight");
        return policy.preflight();
    }

    let mut response = next.run(request).await;
    policy.apply(response.headers_mut());
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_preflight_has_full_set_and_no_body() {
        let policy = CorsPolicy::from_config(&CorsConfig::default()).unwrap();
        let response = policy.preflight();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_METHODS],
            "GET, POST, PUT, DELETE, OPTIONS"
        );
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_HEADERS],
            "Content-Type, Authorization, X-Store-Id, X-PF-Language"
        );
        assert_eq!(headers[header::ACCESS_CONTROL_MAX_AGE], "86400");

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.is_empty());
    }

    #[test]
    fn test_apply_overwrites() {
        let config = CorsConfig {
            allow_origin: "https://shop.example".into(),
            ..CorsConfig::default()
        };
        let policy = CorsPolicy::from_config(&config).unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
        policy.apply(&mut headers);
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "https://shop.example");
        assert_eq!(headers.len(), 4);
    }
}
