//! Webhook subscription bodies for `POST /webhooks`.

use axum::http::Method;
use serde::Serialize;

use super::PayloadError;
use crate::upstream::UpstreamCall;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebhookSubscription {
    pub url: String,
    /// Event names such as `order_created` or `package_shipped`.
    pub types: Vec<String>,
}

impl WebhookSubscription {
    pub fn to_call(&self) -> Result<UpstreamCall, PayloadError> {
        Ok(UpstreamCall::new(Method::POST, "/webhooks").with_body(serde_json::to_vec(self)?))
    }
}

pub fn webhook_subscription<I, S>(
    url: impl Into<String>,
    types: I,
) -> Result<WebhookSubscription, PayloadError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let types: Vec<String> = types.into_iter().map(Into::into).collect();
    if types.is_empty() {
        return Err(PayloadError::NoEventTypes);
    }
    Ok(WebhookSubscription {
        url: url.into(),
        types,
    })
}
