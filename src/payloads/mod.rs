//! Request bodies for the state-changing Printful endpoints.
//!
//! # Responsibilities
//! - Shape customer and product data into Printful order bodies
//! - Build design upload and webhook subscription bodies
//! - Turn each body into an `UpstreamCall` for the forwarder
//!
//! # Design Decisions
//! - Pure functions: no I/O, the caller decides where the call goes
//! - No schema validation beyond what is needed to build a sane body;
//!   Printful stays the authority on field contents

pub mod file;
pub mod order;
pub mod webhook;

use rand::Rng;
use thiserror::Error;

pub use file::{design_upload, FileUpload};
pub use order::{
    multi_item_order, simple_order, Customer, Design, OrderFile, OrderItem, OrderRequest,
    OrderSpec, PackingSlip, ProductSelection, Recipient,
};
pub use webhook::{webhook_subscription, WebhookSubscription};

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SUFFIX_LEN: usize = 9;

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("an order needs at least one product")]
    EmptyOrder,

    #[error("product with variant {variant_id} has no design file")]
    MissingDesign { variant_id: u64 },

    #[error("quantity for variant {variant_id} must be at least 1")]
    ZeroQuantity { variant_id: u64 },

    #[error("a webhook subscription needs at least one event type")]
    NoEventTypes,

    #[error("failed to encode body: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Milliseconds since the Unix epoch.
pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// `<prefix>_<unix millis>_<9 base36 chars>`.
///
/// Only an idempotency hint for Printful; collisions are harmless.
pub fn generate_external_id(prefix: &str) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("{prefix}_{}_{suffix}", now_millis())
}
