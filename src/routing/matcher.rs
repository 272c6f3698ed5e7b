//! Path matching logic.
//!
//! # Responsibilities
//! - Split `/api/...` paths into a category and its trailing segments
//! - Recognize the fixed endpoint shapes of each category
//! - Extract numeric resource ids
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - Ids must be ASCII digits only; anything else is no match
//! - One trailing slash is tolerated on resource paths
//! - No regex to guarantee O(n) matching

use axum::http::Method;

/// Route categories the gateway recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteCategory {
    Health,
    Info,
    Products,
    Orders,
    Stores,
    Files,
    Webhooks,
}

impl RouteCategory {
    /// Lowercase name used in logs, metrics and titles.
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteCategory::Health => "health",
            RouteCategory::Info => "info",
            RouteCategory::Products => "products",
            RouteCategory::Orders => "orders",
            RouteCategory::Stores => "stores",
            RouteCategory::Files => "files",
            RouteCategory::Webhooks => "webhooks",
        }
    }

    /// Prefix for category-specific error codes (`ORDERS_INVALID_ROUTE`).
    pub fn code_prefix(&self) -> &'static str {
        match self {
            RouteCategory::Health => "HEALTH",
            RouteCategory::Info => "INFO",
            RouteCategory::Products => "PRODUCTS",
            RouteCategory::Orders => "ORDERS",
            RouteCategory::Stores => "STORES",
            RouteCategory::Files => "FILES",
            RouteCategory::Webhooks => "WEBHOOKS",
        }
    }

    fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "health" => Some(RouteCategory::Health),
            "products" => Some(RouteCategory::Products),
            "orders" => Some(RouteCategory::Orders),
            "stores" => Some(RouteCategory::Stores),
            "files" => Some(RouteCategory::Files),
            "webhooks" => Some(RouteCategory::Webhooks),
            _ => None,
        }
    }
}

impl std::fmt::Display for RouteCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recognized endpoint shape, with its extracted id where it has one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Health,
    Info,
    ProductList,
    Product(String),
    OrderList,
    Order(String),
    OrderConfirm(String),
    StoreList,
    Store(String),
    FileList,
    File(String),
    Webhooks,
}

impl Endpoint {
    pub fn category(&self) -> RouteCategory {
        match self {
            Endpoint::Health => RouteCategory::Health,
            Endpoint::Info => RouteCategory::Info,
            Endpoint::ProductList | Endpoint::Product(_) => RouteCategory::Products,
            Endpoint::OrderList | Endpoint::Order(_) | Endpoint::OrderConfirm(_) => {
                RouteCategory::Orders
            }
            Endpoint::StoreList | Endpoint::Store(_) => RouteCategory::Stores,
            Endpoint::FileList | Endpoint::File(_) => RouteCategory::Files,
            Endpoint::Webhooks => RouteCategory::Webhooks,
        }
    }

    /// Numeric id extracted from the path, if the shape carries one.
    pub fn resource_id(&self) -> Option<&str> {
        match self {
            Endpoint::Product(id)
            | Endpoint::Order(id)
            | Endpoint::OrderConfirm(id)
            | Endpoint::Store(id)
            | Endpoint::File(id) => Some(id),
            _ => None,
        }
    }

    /// Supported verbs, formatted for the `Allow` header.
    pub fn allow(&self) -> &'static str {
        match self {
            Endpoint::OrderList | Endpoint::FileList => "GET, POST",
            Endpoint::Order(_) => "GET, PUT, DELETE",
            Endpoint::OrderConfirm(_) => "POST",
            Endpoint::Webhooks => "GET, POST, DELETE",
            _ => "GET",
        }
    }

    pub fn permits(&self, method: &Method) -> bool {
        self.allow().split(", ").any(|verb| verb == method.as_str())
    }
}

/// Result of matching a path against the endpoint shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathMatch {
    /// A known endpoint.
    Endpoint(Endpoint),
    /// Known category, unknown shape (extra segments, non-numeric id).
    InvalidShape(RouteCategory),
    /// Nothing under `/api` matched.
    NoMatch,
}

/// Returns true if `segment` is a non-empty run of ASCII digits.
pub fn is_numeric_id(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}

/// Match a request path against the fixed endpoint shapes.
pub fn match_path(path: &str) -> PathMatch {
    let rest = match path.strip_prefix("/api") {
        Some(rest) => rest,
        None => return PathMatch::NoMatch,
    };
    if rest.is_empty() || rest == "/" {
        return PathMatch::Endpoint(Endpoint::Info);
    }
    let rest = match rest.strip_prefix('/') {
        Some(rest) => rest,
        None => return PathMatch::NoMatch,
    };
    let rest = rest.strip_suffix('/').unwrap_or(rest);

    let mut segments = rest.split('/');
    let category = match segments.next().and_then(RouteCategory::from_segment) {
        Some(category) => category,
        None => return PathMatch::NoMatch,
    };
    let tail: Vec<&str> = segments.collect();

    let endpoint = match (category, tail.as_slice()) {
        (RouteCategory::Health, []) => Some(Endpoint::Health),
        (RouteCategory::Health, _) => return PathMatch::NoMatch,

        (RouteCategory::Products, []) => Some(Endpoint::ProductList),
        (RouteCategory::Products, [id]) if is_numeric_id(id) => {
            Some(Endpoint::Product(id.to_string()))
        }

        (RouteCategory::Orders, []) => Some(Endpoint::OrderList),
        (RouteCategory::Orders, [id]) if is_numeric_id(id) => {
            Some(Endpoint::Order(id.to_string()))
        }
        (RouteCategory::Orders, [id, "confirm"]) if is_numeric_id(id) => {
            Some(Endpoint::OrderConfirm(id.to_string()))
        }

        (RouteCategory::Stores, []) => Some(Endpoint::StoreList),
        (RouteCategory::Stores, [id]) if is_numeric_id(id) => {
            Some(Endpoint::Store(id.to_string()))
        }

        (RouteCategory::Files, []) => Some(Endpoint::FileList),
        (RouteCategory::Files, [id]) if is_numeric_id(id) => {
            Some(Endpoint::File(id.to_string()))
        }

        (RouteCategory::Webhooks, []) => Some(Endpoint::Webhooks),

        _ => None,
    };

    match endpoint {
        Some(endpoint) => PathMatch::Endpoint(endpoint),
        None => PathMatch::InvalidShape(category),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_id() {
        assert!(is_numeric_id("42"));
        assert!(is_numeric_id("000123"));
        assert!(!is_numeric_id(""));
        assert!(!is_numeric_id("12a"));
        assert!(!is_numeric_id("-1"));
        assert!(!is_numeric_id("٣")); // non-ASCII digit
    }

    #[test]
    fn test_info_paths() {
        assert_eq!(match_path("/api"), PathMatch::Endpoint(Endpoint::Info));
        assert_eq!(match_path("/api/"), PathMatch::Endpoint(Endpoint::Info));
    }

    #[test]
    fn test_resource_shapes() {
        assert_eq!(match_path("/api/health"), PathMatch::Endpoint(Endpoint::Health));
        assert_eq!(match_path("/api/products/"), PathMatch::Endpoint(Endpoint::ProductList));
        assert_eq!(
            match_path("/api/orders/17/confirm"),
            PathMatch::Endpoint(Endpoint::OrderConfirm("17".into()))
        );
        assert_eq!(match_path("/api/files/9"), PathMatch::Endpoint(Endpoint::File("9".into())));
        assert_eq!(match_path("/api/webhooks"), PathMatch::Endpoint(Endpoint::Webhooks));
    }

    #[test]
    fn test_invalid_shapes_keep_category() {
        assert_eq!(
            match_path("/api/products/tshirt"),
            PathMatch::InvalidShape(RouteCategory::Products)
        );
        assert_eq!(
            match_path("/api/orders/17/cancel"),
            PathMatch::InvalidShape(RouteCategory::Orders)
        );
        assert_eq!(match_path("/api/webhooks/3"), PathMatch::InvalidShape(RouteCategory::Webhooks));
        assert_eq!(match_path("/api/stores//"), PathMatch::InvalidShape(RouteCategory::Stores));
    }

    #[test]
    fn test_no_match() {
        assert_eq!(match_path("/"), PathMatch::NoMatch);
        assert_eq!(match_path("/apis/orders"), PathMatch::NoMatch);
        assert_eq!(match_path("/api/customers"), PathMatch::NoMatch);
        assert_eq!(match_path("/api/health/deep"), PathMatch::NoMatch);
        assert_eq!(match_path("/API/orders"), PathMatch::NoMatch);
    }

    #[test]
    fn test_permits() {
        assert!(Endpoint::OrderList.permits(&Method::POST));
        assert!(!Endpoint::OrderList.permits(&Method::DELETE));
        assert!(Endpoint::Order("1".into()).permits(&Method::PUT));
        assert!(!Endpoint::OrderConfirm("1".into()).permits(&Method::GET));
        assert!(Endpoint::Webhooks.permits(&Method::DELETE));
        assert!(!Endpoint::Webhooks.permits(&Method::PATCH));
        assert!(!Endpoint::Health.permits(&Method::HEAD));
    }
}
