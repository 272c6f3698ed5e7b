//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all gateway handler
//! - Wire up middleware (request ID, tracing, timing, CORS, panic guard)
//! - Check the API key, rate limit, route, forward
//! - Serve until the shutdown signal fires

use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header::InvalidHeaderValue, Request},
    middleware,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::config::GatewayConfig;
use crate::http::local;
use crate::http::middleware::{cors_middleware, timing_middleware, CorsPolicy};
use crate::http::request::{
    client_key, propagate_request_id_layer, request_id, set_request_id_layer,
};
use crate::http::response::GatewayError;
use crate::routing::{Dispatch, Router as ApiRouter};
use crate::security::RateLimiter;
use crate::upstream::UpstreamClient;

/// Errors building the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("invalid CORS configuration: {0}")]
    Cors(#[from] InvalidHeaderValue),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<ApiRouter>,
    pub upstream: UpstreamClient,
    pub limiter: Option<Arc<RateLimiter>>,
    pub max_body_size: usize,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, ServerError> {
        let upstream = UpstreamClient::new(&config.upstream)?;
        let cors = Arc::new(CorsPolicy::from_config(&config.cors)?);
        let limiter = config
            .rate_limit
            .enabled
            .then(|| Arc::new(RateLimiter::new(config.rate_limit.clone())));

        let state = AppState {
            router: Arc::new(ApiRouter::new(config.upstream.catalog_scope)),
            upstream,
            limiter,
            max_body_size: config.security.max_body_size,
        };

        let router = Self::build_router(state, cors);
        Ok(Self { router })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState, cors: Arc<CorsPolicy>) -> Router {
        Router::new()
            .route("/{*path}", any(gateway_handler))
            .route("/", any(gateway_handler))
            .with_state(state)
            .layer(CatchPanicLayer::custom(panic_response))
            .layer(middleware::from_fn_with_state(cors, cors_middleware))
            .layer(middleware::from_fn(timing_middleware))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// The fully layered router, for in-process callers and tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Main gateway handler.
/// Every failure becomes an error envelope here; nothing escapes as a bare status.
async fn gateway_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let request_id = request_id(&request).to_string();
    match handle(&state, request).await {
        Ok(response) => response,
        Err(err) => {
            let status = err.status();
            if status.is_server_error() {
                tracing::error!(
                    request_id = %request_id,
                    code = %err.code(),
                    error = %err,
                    "Request failed"
                );
            } else {
                tracing::warn!(
                    request_id = %request_id,
                    code = %err.code(),
                    error = %err,
                    "Request rejected"
                );
            }
            err.into_response()
        }
    }
}

async fn handle(state: &AppState, request: Request<Body>) -> Result<Response, GatewayError> {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    tracing::info!(
        request_id = %request_id(&request),
        method = %method,
        path = %path,
        "Inbound request"
    );

    // 1. API key precondition, before routing
    if !state.upstream.is_configured() {
        return Err(GatewayError::Configuration);
    }

    // 2. Admission
    if let Some(limiter) = &state.limiter {
        limiter.check(&client_key(&request), &method)?;
    }

    // 3. Route
    let route = state.router.resolve(&method, &path, request.uri().query())?;

    // 4. Dispatch
    match route.dispatch {
        // Always configured here: the key check above already rejected the rest.
        Dispatch::Health => Ok(local::health(
            state.upstream.is_configured(),
            state.router.catalog_scope(),
        )),
        Dispatch::Info => Ok(local::info(&state.router)),
        Dispatch::Forward { mut call, takes_body } => {
            if takes_body {
                let body = axum::body::to_bytes(request.into_body(), state.max_body_size)
                    .await
                    .map_err(|e| GatewayError::InvalidBody(e.to_string()))?;
                call = call.with_body(body);
            }

            tracing::debug!(
                category = %route.category,
                resource_id = route.resource_id.as_deref().unwrap_or("-"),
                upstream = %call.path,
                "Route matched"
            );

            let response = state.upstream.forward(call).await?;
            Ok(response.into_response())
        }
    }
}

/// Top-level guard: a panic anywhere below becomes an INTERNAL_SERVER_ERROR envelope.
fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "An unexpected error occurred".to_string()
    };
    tracing::error!(panic = %detail, "Handler panicked");
    GatewayError::Internal(detail).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_panic_response_is_envelope() {
        let response = panic_response(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "INTERNAL_SERVER_ERROR");
        assert_eq!(body["error"]["message"], "boom");
    }

    #[test]
    fn test_invalid_cors_rejected() {
        let mut config = GatewayConfig::default();
        config.cors.allow_origin = "bad\nvalue".into();
        assert!(matches!(HttpServer::new(config), Err(ServerError::Cors(_))));
    }
}
