//! Printful API client.
//!
//! # Responsibilities
//! - Attach bearer auth, user agent, locale and store headers
//! - Issue exactly one HTTP call per forward (no retries)
//! - Read the full body as text and classify the outcome

use std::error::Error as _;
use std::time::{Duration, Instant};

use axum::http::{header, HeaderValue};

use crate::config::UpstreamConfig;
use crate::http::response::GatewayError;
use crate::observability::metrics;
use crate::upstream::types::{UpstreamCall, UpstreamResponse};

/// User agent sent on every upstream call.
pub const USER_AGENT: &str = concat!("printful-proxy/", env!("CARGO_PKG_VERSION"));

/// Header selecting the response language.
pub const X_PF_LANGUAGE: &str = "x-pf-language";
/// Header selecting the store for account-level tokens.
pub const X_PF_STORE_ID: &str = "x-pf-store-id";

/// Forwarder for the Printful API.
#[derive(Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    language: Option<HeaderValue>,
    store_id: Option<HeaderValue>,
}

impl std::fmt::Debug for UpstreamClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamClient")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("language", &self.language)
            .field("store_id", &self.store_id)
            .finish()
    }
}

impl UpstreamClient {
    /// Build a client from upstream configuration.
    pub fn new(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            http: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key().map(str::to_string),
            language: config
                .language
                .as_deref()
                .and_then(|v| HeaderValue::from_str(v).ok()),
            store_id: config
                .store_id
                .as_deref()
                .and_then(|v| HeaderValue::from_str(v).ok()),
        })
    }

    /// Whether a bearer token is available.
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Full upstream URL for a call.
    pub fn url_for(&self, call: &UpstreamCall) -> String {
        format!("{}{}", self.base_url, call.path)
    }

    /// Issue one call and classify the result.
    ///
    /// Success statuses come back as `Ok`; upstream error statuses and
    /// transport failures come back as the matching `GatewayError`.
    pub async fn forward(&self, call: UpstreamCall) -> Result<UpstreamResponse, GatewayError> {
        let api_key = self.api_key.as_deref().ok_or(GatewayError::Configuration)?;
        let url = self.url_for(&call);
        let start = Instant::now();

        let mut request = self
            .http
            .request(call.method.clone(), &url)
            .bearer_auth(api_key)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(language) = &self.language {
            request = request.header(X_PF_LANGUAGE, language.clone());
        }
        if let Some(store_id) = &self.store_id {
            request = request.header(X_PF_STORE_ID, store_id.clone());
        }
        if let Some(body) = call.outbound_body() {
            request = request.body(body.clone());
        }

        tracing::debug!(method = %call.method, url = %url, "Forwarding to Printful API");

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return Err(self.connection_error(&call, &url, &e, start)),
        };
        let status = response.status();
        let raw = match response.text().await {
            Ok(raw) => raw,
            Err(e) => return Err(self.connection_error(&call, &url, &e, start)),
        };

        metrics::record_upstream(call.method.as_str(), status.as_u16(), start);
        tracing::debug!(
            method = %call.method,
            url = %url,
            status = status.as_u16(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Printful API responded"
        );

        let response = UpstreamResponse::from_text(status, raw);
        if !response.is_json() {
            tracing::debug!(url = %url, status = status.as_u16(), "Printful API body is not JSON");
        }
        if status.is_success() {
            Ok(response)
        } else {
            tracing::warn!(
                method = %call.method,
                url = %url,
                status = status.as_u16(),
                "Printful API error"
            );
            Err(response.into_error())
        }
    }

    fn connection_error(
        &self,
        call: &UpstreamCall,
        url: &str,
        error: &reqwest::Error,
        start: Instant,
    ) -> GatewayError {
        let detail = error_chain(error);
        metrics::record_upstream(call.method.as_str(), 502, start);
        tracing::error!(
            method = %call.method,
            url = %url,
            error = %detail,
            "Printful API unreachable"
        );
        GatewayError::Connection(detail)
    }
}

/// Render an error with its source chain, e.g. `error sending request: connection refused`.
fn error_chain(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;

    fn config(key: Option<&str>) -> UpstreamConfig {
        UpstreamConfig {
            base_url: "https://api.printful.com/".into(),
            api_key: key.map(str::to_string),
            language: Some("es_ES".into()),
            ..UpstreamConfig::default()
        }
    }

    #[test]
    fn test_url_join() {
        let client = UpstreamClient::new(&config(Some("k"))).unwrap();
        let call = UpstreamCall::new(Method::GET, "/orders?status=fulfilled");
        assert_eq!(client.url_for(&call), "https://api.printful.com/orders?status=fulfilled");
    }

    #[test]
    fn test_debug_redacts_key() {
        let client = UpstreamClient::new(&config(Some("super-secret"))).unwrap();
        let rendered = format!("{:?}", client);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_network() {
        let client = UpstreamClient::new(&config(None)).unwrap();
        assert!(!client.is_configured());

        let err = client
            .forward(UpstreamCall::new(Method::GET, "/orders"))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Configuration));
    }

    #[tokio::test]
    async fn test_connection_error_keeps_cause_chain() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let mut upstream = config(Some("k"));
        upstream.base_url = format!("http://{addr}");
        let client = UpstreamClient::new(&upstream).unwrap();

        let err = client
            .forward(UpstreamCall::new(Method::GET, "/stores"))
            .await
            .unwrap_err();
        let GatewayError::Connection(detail) = &err else {
            panic!("expected connection error, got {err:?}");
        };
        assert!(detail.starts_with("error sending request"), "{detail}");
        assert!(detail.to_lowercase().contains("connect"), "{detail}");
        assert!(err.to_string().starts_with("Could not connect to the Printful API: "));
    }
}
