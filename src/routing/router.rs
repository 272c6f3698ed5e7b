//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Resolve (method, path, query) to a local endpoint or an upstream call
//! - Translate inbound paths into Printful API paths
//! - Return an explicit error for unknown paths and unsupported verbs
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Query strings are re-encoded from an ordered, single-valued map
//! - Catalog scope decides between `/products` and `/store/products`

use axum::http::Method;

use crate::config::CatalogScope;
use crate::http::response::GatewayError;
use crate::routing::matcher::{match_path, Endpoint, PathMatch, RouteCategory};
use crate::upstream::UpstreamCall;

/// What the gateway should do with a matched request.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// Answer with the local health document.
    Health,
    /// Answer with the local API description.
    Info,
    /// Forward upstream; `takes_body` says whether the inbound body goes along.
    Forward { call: UpstreamCall, takes_body: bool },
}

/// A successfully resolved request.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteMatch {
    pub category: RouteCategory,
    pub resource_id: Option<String>,
    pub dispatch: Dispatch,
}

/// Parse a raw query string into ordered, single-valued pairs.
///
/// A repeated key keeps the position of its first occurrence and the value of
/// its last one.
pub fn parse_query(raw: Option<&str>) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = Vec::new();
    let Some(raw) = raw else {
        return pairs;
    };
    for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
        match pairs.iter_mut().find(|(k, _)| *k == key) {
            Some(existing) => existing.1 = value.into_owned(),
            None => pairs.push((key.into_owned(), value.into_owned())),
        }
    }
    pairs
}

/// Append an encoded query string to `path` when there are parameters.
pub fn with_query(path: String, query: &[(String, String)]) -> String {
    if query.is_empty() {
        return path;
    }
    let encoded = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(query.iter())
        .finish();
    format!("{}?{}", path, encoded)
}

/// The gateway's fixed route table.
#[derive(Debug, Clone, Default)]
pub struct Router {
    catalog_scope: CatalogScope,
}

impl Router {
    pub fn new(catalog_scope: CatalogScope) -> Self {
        Self { catalog_scope }
    }

    pub fn catalog_scope(&self) -> CatalogScope {
        self.catalog_scope
    }

    /// Resolve a request to a local endpoint or an upstream call.
    pub fn resolve(
        &self,
        method: &Method,
        path: &str,
        query: Option<&str>,
    ) -> Result<RouteMatch, GatewayError> {
        let endpoint = match match_path(path) {
            PathMatch::Endpoint(endpoint) => endpoint,
            PathMatch::InvalidShape(category) => {
                return Err(GatewayError::InvalidRoute {
                    category,
                    path: path.to_string(),
                    method: method.clone(),
                });
            }
            PathMatch::NoMatch => {
                return Err(GatewayError::EndpointNotFound {
                    path: path.to_string(),
                });
            }
        };

        let category = endpoint.category();
        if !endpoint.permits(method) {
            return Err(GatewayError::MethodNotAllowed {
                category,
                path: path.to_string(),
                method: method.clone(),
                allow: endpoint.allow(),
            });
        }

        let resource_id = endpoint.resource_id().map(str::to_string);
        let dispatch = match endpoint {
            Endpoint::Health => Dispatch::Health,
            Endpoint::Info => Dispatch::Info,
            other => {
                let upstream_path = with_query(self.upstream_path(&other), &parse_query(query));
                Dispatch::Forward {
                    call: UpstreamCall::new(method.clone(), upstream_path),
                    takes_body: matches!(*method, Method::POST | Method::PUT)
                        && !matches!(other, Endpoint::OrderConfirm(_)),
                }
            }
        };

        Ok(RouteMatch {
            category,
            resource_id,
            dispatch,
        })
    }

    fn upstream_path(&self, endpoint: &Endpoint) -> String {
        let products = match self.catalog_scope {
            CatalogScope::Global => "/products",
            CatalogScope::Store => "/store/products",
        };
        match endpoint {
            Endpoint::ProductList => products.to_string(),
            Endpoint::Product(id) => format!("{}/{}", products, id),
            Endpoint::OrderList => "/orders".to_string(),
            Endpoint::Order(id) => format!("/orders/{}", id),
            Endpoint::OrderConfirm(id) => format!("/orders/{}/confirm", id),
            Endpoint::StoreList => "/stores".to_string(),
            Endpoint::Store(id) => format!("/stores/{}", id),
            Endpoint::FileList => "/files".to_string(),
            Endpoint::File(id) => format!("/files/{}", id),
            Endpoint::Webhooks => "/webhooks".to_string(),
            Endpoint::Health | Endpoint::Info => String::new(),
        }
    }

    /// Human-readable endpoint list served by the info route.
    pub fn describe(&self) -> Vec<&'static str> {
        let mut endpoints = vec![
            "GET /api/health - Health check",
            "GET /api - API information",
        ];
        endpoints.extend(match self.catalog_scope {
            CatalogScope::Global => [
                "GET /api/products - List catalog products",
                "GET /api/products/{id} - Get a catalog product",
            ],
            CatalogScope::Store => [
                "GET /api/products - List store products",
                "GET /api/products/{id} - Get a store product",
            ],
        });
        endpoints.extend([
            "GET /api/orders - List orders",
            "POST /api/orders - Create an order",
            "GET /api/orders/{id} - Get an order",
            "PUT /api/orders/{id} - Update an order",
            "DELETE /api/orders/{id} - Cancel an order",
            "POST /api/orders/{id}/confirm - Confirm an order for fulfillment",
            "GET /api/stores - List stores",
            "GET /api/stores/{id} - Get a store",
            "GET /api/files - List files",
            "POST /api/files - Add a file",
            "GET /api/files/{id} - Get a file",
            "GET /api/webhooks - Get webhook configuration",
            "POST /api/webhooks - Set up webhooks",
            "DELETE /api/webhooks - Disable webhooks",
        ]);
        endpoints
    }
}
