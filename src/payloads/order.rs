//! Order bodies for `POST /orders`.

use axum::http::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{generate_external_id, now_millis, PayloadError};
use crate::upstream::UpstreamCall;

const DEFAULT_SHIPPING: &str = "STANDARD";
const DEFAULT_FILE_TYPE: &str = "default";
pub const DEFAULT_STORE_EMAIL: &str = "store@example.com";
pub const DEFAULT_STORE_NAME: &str = "Custom Store";

/// The person an order ships to.
#[derive(Debug, Clone, Deserialize)]
pub struct Customer {
    pub name: String,
    #[serde(alias = "address")]
    pub address1: String,
    pub city: String,
    #[serde(alias = "state")]
    pub state_code: String,
    #[serde(alias = "country")]
    pub country_code: String,
    pub zip: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Reply-to address printed on the packing slip.
    #[serde(default)]
    pub store_email: Option<String>,
    #[serde(default)]
    pub store_name: Option<String>,
}

/// A design placed on a product.
#[derive(Debug, Clone, Deserialize)]
pub struct Design {
    pub url: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

/// One product a customer picked.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductSelection {
    pub variant_id: u64,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    pub price: f64,
    #[serde(default)]
    pub designs: Vec<Design>,
    #[serde(default)]
    pub options: Vec<Value>,
}

fn default_quantity() -> u32 {
    1
}

/// Input document for building an order: who, and what.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderSpec {
    pub customer: Customer,
    pub products: Vec<ProductSelection>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recipient {
    pub name: String,
    pub address1: String,
    pub city: String,
    pub state_code: String,
    pub country_code: String,
    pub zip: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl From<&Customer> for Recipient {
    fn from(customer: &Customer) -> Self {
        Self {
            name: customer.name.clone(),
            address1: customer.address1.clone(),
            city: customer.city.clone(),
            state_code: customer.state_code.clone(),
            country_code: customer.country_code.clone(),
            zip: customer.zip.clone(),
            phone: customer.phone.clone(),
            email: customer.email.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderFile {
    pub url: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderItem {
    pub variant_id: u64,
    pub quantity: u32,
    /// Printful expects a decimal string.
    pub retail_price: String,
    pub files: Vec<OrderFile>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackingSlip {
    pub email: String,
    pub message: String,
    pub store_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRequest {
    pub external_id: String,
    pub recipient: Recipient,
    pub items: Vec<OrderItem>,
    pub shipping: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub packing_slip: Option<PackingSlip>,
}

impl OrderRequest {
    /// `POST /orders?confirm=<bool>` carrying this order.
    ///
    /// An unconfirmed order stays a draft on the Printful side.
    pub fn to_call(&self, confirm: bool) -> Result<UpstreamCall, PayloadError> {
        let body = serde_json::to_vec(self)?;
        Ok(UpstreamCall::new(Method::POST, format!("/orders?confirm={confirm}")).with_body(body))
    }
}

/// One line item with one default design file.
pub fn simple_order(
    customer: &Customer,
    product: &ProductSelection,
    quantity: u32,
) -> Result<OrderRequest, PayloadError> {
    if quantity == 0 {
        return Err(PayloadError::ZeroQuantity {
            variant_id: product.variant_id,
        });
    }
    let design = product
        .designs
        .first()
        .ok_or(PayloadError::MissingDesign {
            variant_id: product.variant_id,
        })?;

    Ok(OrderRequest {
        external_id: generate_external_id("order"),
        recipient: Recipient::from(customer),
        items: vec![OrderItem {
            variant_id: product.variant_id,
            quantity,
            retail_price: product.price.to_string(),
            files: vec![OrderFile {
                url: design.url.clone(),
                kind: DEFAULT_FILE_TYPE.to_string(),
            }],
            options: Vec::new(),
        }],
        shipping: DEFAULT_SHIPPING.to_string(),
        packing_slip: None,
    })
}

/// One line item per product, plus a packing slip.
pub fn multi_item_order(
    customer: &Customer,
    products: &[ProductSelection],
) -> Result<OrderRequest, PayloadError> {
    if products.is_empty() {
        return Err(PayloadError::EmptyOrder);
    }

    let items = products
        .iter()
        .map(|product| {
            if product.quantity == 0 {
                return Err(PayloadError::ZeroQuantity {
                    variant_id: product.variant_id,
                });
            }
            Ok(OrderItem {
                variant_id: product.variant_id,
                quantity: product.quantity,
                retail_price: product.price.to_string(),
                files: product
                    .designs
                    .iter()
                    .map(|design| OrderFile {
                        url: design.url.clone(),
                        kind: design
                            .kind
                            .clone()
                            .unwrap_or_else(|| DEFAULT_FILE_TYPE.to_string()),
                    })
                    .collect(),
                options: product.options.clone(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let packing_slip = PackingSlip {
        email: customer
            .store_email
            .clone()
            .unwrap_or_else(|| DEFAULT_STORE_EMAIL.to_string()),
        message: format!("Order #{}", now_millis()),
        store_name: customer
            .store_name
            .clone()
            .unwrap_or_else(|| DEFAULT_STORE_NAME.to_string()),
    };

    Ok(OrderRequest {
        external_id: generate_external_id("order_multi"),
        recipient: Recipient::from(customer),
        items,
        shipping: DEFAULT_SHIPPING.to_string(),
        packing_slip: Some(packing_slip),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn customer() -> Customer {
        serde_json::from_value(json!({
            "name": "Ana Ruiz",
            "address": "Calle Mayor 1",
            "city": "Madrid",
            "state": "M",
            "country": "ES",
            "zip": "28013",
            "email": "ana@example.com"
        }))
        .unwrap()
    }

    fn product(variant_id: u64) -> ProductSelection {
        ProductSelection {
            variant_id,
            quantity: 2,
            price: 25.99,
            designs: vec![Design {
                url: "https://cdn.example.com/front.png".into(),
                kind: Some("front".into()),
            }],
            options: Vec::new(),
        }
    }

    #[test]
    fn test_simple_order_body() {
        let order = simple_order(&customer(), &product(4012), 3).unwrap();
        let body = serde_json::to_value(&order).unwrap();

        assert!(order.external_id.starts_with("order_"));
        assert_eq!(body["recipient"]["address1"], "Calle Mayor 1");
        assert_eq!(body["recipient"]["country_code"], "ES");
        assert!(body["recipient"].get("phone").is_none());
        assert_eq!(body["items"][0]["quantity"], 3);
        assert_eq!(body["items"][0]["retail_price"], "25.99");
        assert_eq!(body["items"][0]["files"][0]["type"], "default");
        assert!(body["items"][0].get("options").is_none());
        assert_eq!(body["shipping"], "STANDARD");
        assert!(body.get("packing_slip").is_none());
    }

    #[test]
    fn test_simple_order_needs_design() {
        let mut bare = product(1);
        bare.designs.clear();
        assert!(matches!(
            simple_order(&customer(), &bare, 1),
            Err(PayloadError::MissingDesign { variant_id: 1 })
        ));
        assert!(matches!(
            simple_order(&customer(), &product(1), 0),
            Err(PayloadError::ZeroQuantity { .. })
        ));
    }

    #[test]
    fn test_multi_item_order() {
        let mut second = product(4013);
        second.designs[0].kind = None;
        second.options = vec![json!({"id": "stitch_color", "value": "white"})];

        let order = multi_item_order(&customer(), &[product(4012), second]).unwrap();
        assert!(order.external_id.starts_with("order_multi_"));
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.items[0].files[0].kind, "front");
        assert_eq!(order.items[1].files[0].kind, "default");
        assert_eq!(order.items[1].options.len(), 1);

        let slip = order.packing_slip.unwrap();
        assert_eq!(slip.email, DEFAULT_STORE_EMAIL);
        assert_eq!(slip.store_name, DEFAULT_STORE_NAME);
        assert!(slip.message.starts_with("Order #"));
    }

    #[test]
    fn test_multi_item_order_rejects_empty() {
        assert!(matches!(
            multi_item_order(&customer(), &[]),
            Err(PayloadError::EmptyOrder)
        ));
    }

    #[test]
    fn test_order_call() {
        let order = simple_order(&customer(), &product(4012), 1).unwrap();

        let call = order.to_call(true).unwrap();
        assert_eq!(call.method, Method::POST);
        assert_eq!(call.path, "/orders?confirm=true");
        let sent: Value = serde_json::from_slice(call.outbound_body().unwrap()).unwrap();
        assert_eq!(sent["external_id"], order.external_id);

        assert_eq!(order.to_call(false).unwrap().path, "/orders?confirm=false");
    }

    #[test]
    fn test_order_spec_from_json() {
        let spec: OrderSpec = serde_json::from_value(json!({
            "customer": {
                "name": "Ana Ruiz", "address1": "Calle Mayor 1", "city": "Madrid",
                "state_code": "M", "country_code": "ES", "zip": "28013"
            },
            "products": [
                {"variant_id": 4012, "price": 19.5, "designs": [{"url": "https://x/y.png"}]}
            ]
        }))
        .unwrap();
        assert_eq!(spec.products[0].quantity, 1);
        assert_eq!(spec.products[0].price.to_string(), "19.5");
    }
}
