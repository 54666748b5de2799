//! Outbound checkout request and the provider's reply.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::OrderId;
use crate::domain::order::Currency;

use super::signature::{self, Signable, SignedFields, SignedValue};

/// Default checkout page language.
pub const DEFAULT_LANGUAGE: &str = "ru";

/// What the application needs a payment link for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratePaymentLinkInput {
    pub order_id: OrderId,
    /// Minor currency units.
    pub amount: u64,
    pub currency: Currency,
    pub order_desc: String,
    pub callback_url: Option<String>,
    pub response_url: Option<String>,
    pub sender_email: Option<String>,
}

/// Signed checkout request, sent as `{"request": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutRequest {
    pub order_id: String,
    pub merchant_id: i64,
    pub order_desc: String,
    pub signature: String,
    pub amount: String,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_callback_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_email: Option<String>,
    #[serde(rename = "lang", skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
}

impl CheckoutRequest {
    /// Builds the request and signs it with the merchant password.
    pub fn signed(
        input: &GeneratePaymentLinkInput,
        merchant_id: i64,
        language: &str,
        secret: &str,
    ) -> Self {
        let mut request = Self {
            order_id: input.order_id.to_string(),
            merchant_id,
            order_desc: input.order_desc.clone(),
            signature: String::new(),
            amount: input.amount.to_string(),
            currency: input.currency.to_string(),
            response_url: input.response_url.clone(),
            server_callback_url: input.callback_url.clone(),
            sender_email: input.sender_email.clone(),
            language: Some(language.to_string()).filter(|l| !l.is_empty()),
            product_id: None,
        };
        request.signature = signature::sign(&request.signed_fields(), secret);
        request
    }
}

impl Signable for CheckoutRequest {
    fn signed_fields(&self) -> SignedFields {
        let optional =
            |v: &Option<String>| -> SignedValue { v.as_deref().unwrap_or_default().into() };

        let mut fields = SignedFields::new();
        fields.insert("order_id", (&self.order_id).into());
        fields.insert("merchant_id", self.merchant_id.into());
        fields.insert("order_desc", (&self.order_desc).into());
        fields.insert("amount", (&self.amount).into());
        fields.insert("currency", (&self.currency).into());
        fields.insert("response_url", optional(&self.response_url));
        fields.insert("server_callback_url", optional(&self.server_callback_url));
        fields.insert("sender_email", optional(&self.sender_email));
        fields.insert("lang", optional(&self.language));
        fields.insert("product_id", optional(&self.product_id));
        fields
    }
}

/// Envelope for outbound requests.
#[derive(Debug, Serialize)]
pub struct ApiRequest<'a, T> {
    pub request: &'a T,
}

/// Envelope for provider replies.
#[derive(Debug, Deserialize)]
pub struct ApiResponse {
    pub response: CheckoutResponse,
}

/// Provider reply to a checkout request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutResponse {
    #[serde(default)]
    pub response_status: String,
    #[serde(default)]
    pub checkout_url: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub payment_id: String,
    #[serde(default)]
    pub error_message: String,
    #[serde(default)]
    pub error_code: Option<i64>,
}

impl CheckoutResponse {
    pub fn is_success(&self) -> bool {
        self.response_status == super::callback::RESPONSE_STATUS_SUCCESS
    }
}

/// The provider sends `payment_id` as a number on success and omits it
/// otherwise; older API versions send it as a string.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Text(s)) => s,
        Some(Raw::Number(n)) => n.to_string(),
        None => String::new(),
    })
}
