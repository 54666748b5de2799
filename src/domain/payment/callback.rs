//! Provider callback payload.
//!
//! The field set mirrors what the provider posts to the server callback URL.
//! Only a handful of fields drive settlement, but all of them are signed, so
//! all of them are kept.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::OrderId;
use crate::domain::order::OrderStatus;

use super::signature::{Signable, SignedFields, SignedValue};

/// `response_status` value for a delivery the provider processed.
pub const RESPONSE_STATUS_SUCCESS: &str = "success";

/// `response_code` arrives as a string, a number, or not at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseCode {
    Number(i64),
    Text(String),
}

/// Raw callback body as posted by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Callback {
    pub order_id: String,
    pub merchant_id: i64,
    pub order_status: String,
    pub response_status: String,
    pub signature: String,

    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub tran_type: String,
    #[serde(default)]
    pub sender_cell_phone: String,
    #[serde(default)]
    pub sender_account: String,
    #[serde(default)]
    pub card_bin: i64,
    #[serde(default)]
    pub masked_card: String,
    #[serde(default)]
    pub card_type: String,
    #[serde(default)]
    pub rrn: String,
    #[serde(default)]
    pub approval_code: String,
    #[serde(default)]
    pub response_code: Option<ResponseCode>,
    #[serde(default)]
    pub response_description: String,
    #[serde(default)]
    pub reversal_amount: String,
    #[serde(default)]
    pub settlement_amount: String,
    #[serde(default)]
    pub settlement_currency: String,
    #[serde(default)]
    pub order_time: String,
    #[serde(default)]
    pub settlement_date: String,
    #[serde(default)]
    pub eci: String,
    #[serde(default)]
    pub fee: String,
    #[serde(default)]
    pub payment_system: String,
    #[serde(default)]
    pub sender_email: String,
    #[serde(default)]
    pub payment_id: i64,
    #[serde(default)]
    pub actual_amount: String,
    #[serde(default)]
    pub actual_currency: String,
    #[serde(default)]
    pub merchant_data: String,
    #[serde(default)]
    pub verification_status: String,
    #[serde(default)]
    pub rectoken: String,
    #[serde(default)]
    pub rectoken_lifetime: String,
    #[serde(default)]
    pub product_id: String,
    #[serde(default)]
    pub additional_info: String,
    #[serde(default)]
    pub response_signature_string: String,
}

impl Signable for Callback {
    /// Every field except `signature` and `response_signature_string`.
    fn signed_fields(&self) -> SignedFields {
        let mut fields = SignedFields::new();
        fields.insert("order_id", (&self.order_id).into());
        fields.insert("merchant_id", self.merchant_id.into());
        fields.insert("order_status", (&self.order_status).into());
        fields.insert("response_status", (&self.response_status).into());
        fields.insert("amount", (&self.amount).into());
        fields.insert("currency", (&self.currency).into());
        fields.insert("tran_type", (&self.tran_type).into());
        fields.insert("sender_cell_phone", (&self.sender_cell_phone).into());
        fields.insert("sender_account", (&self.sender_account).into());
        fields.insert("card_bin", self.card_bin.into());
        fields.insert("masked_card", (&self.masked_card).into());
        fields.insert("card_type", (&self.card_type).into());
        fields.insert("rrn", (&self.rrn).into());
        fields.insert("approval_code", (&self.approval_code).into());
        if let Some(code) = &self.response_code {
            let value = match code {
                ResponseCode::Number(n) => SignedValue::Integer(*n),
                ResponseCode::Text(s) => SignedValue::Text(s.clone()),
            };
            fields.insert("response_code", value);
        }
        fields.insert("response_description", (&self.response_description).into());
        fields.insert("reversal_amount", (&self.reversal_amount).into());
        fields.insert("settlement_amount", (&self.settlement_amount).into());
        fields.insert("settlement_currency", (&self.settlement_currency).into());
        fields.insert("order_time", (&self.order_time).into());
        fields.insert("settlement_date", (&self.settlement_date).into());
        fields.insert("eci", (&self.eci).into());
        fields.insert("fee", (&self.fee).into());
        fields.insert("payment_system", (&self.payment_system).into());
        fields.insert("sender_email", (&self.sender_email).into());
        fields.insert("payment_id", self.payment_id.into());
        fields.insert("actual_amount", (&self.actual_amount).into());
        fields.insert("actual_currency", (&self.actual_currency).into());
        fields.insert("merchant_data", (&self.merchant_data).into());
        fields.insert("verification_status", (&self.verification_status).into());
        fields.insert("rectoken", (&self.rectoken).into());
        fields.insert("rectoken_lifetime", (&self.rectoken_lifetime).into());
        fields.insert("product_id", (&self.product_id).into());
        fields.insert("additional_info", (&self.additional_info).into());
        fields
    }
}

/// Business outcome reported in `order_status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderOrderStatus {
    Created,
    Processing,
    Declined,
    Approved,
    Expired,
    Reversed,
    Unrecognized(String),
}

impl ProviderOrderStatus {
    pub fn parse(s: &str) -> Self {
        match s {
            "created" => Self::Created,
            "processing" => Self::Processing,
            "declined" => Self::Declined,
            "approved" => Self::Approved,
            "expired" => Self::Expired,
            "reversed" => Self::Reversed,
            other => Self::Unrecognized(other.to_string()),
        }
    }

    /// The order status a `Created` order moves to on this outcome.
    pub fn settles_to(&self) -> OrderStatus {
        match self {
            Self::Approved => OrderStatus::Paid,
            Self::Created | Self::Processing | Self::Declined | Self::Expired | Self::Reversed => {
                OrderStatus::Failed
            }
            Self::Unrecognized(_) => OrderStatus::Other,
        }
    }
}

/// A callback whose signature has been checked.
///
/// Only [`super::CallbackVerifier`] can build one, so holding a
/// `ValidatedCallback` means the payload is authentic.
#[derive(Debug, Clone)]
pub struct ValidatedCallback {
    order_id: OrderId,
    callback: Callback,
}

impl ValidatedCallback {
    pub(super) fn new(order_id: OrderId, callback: Callback) -> Self {
        Self { order_id, callback }
    }

    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    pub fn callback(&self) -> &Callback {
        &self.callback
    }

    /// The provider processed the delivery (`response_status == "success"`).
    pub fn is_success(&self) -> bool {
        self.callback.response_status == RESPONSE_STATUS_SUCCESS
    }

    /// The payment itself was approved (`order_status == "approved"`).
    pub fn is_approved(&self) -> bool {
        self.provider_status() == ProviderOrderStatus::Approved
    }

    pub fn provider_status(&self) -> ProviderOrderStatus {
        ProviderOrderStatus::parse(&self.callback.order_status)
    }

    /// Status a `Created` order settles to.
    pub fn target_status(&self) -> OrderStatus {
        self.provider_status().settles_to()
    }

    /// Reported amount in minor units, when present and numeric.
    pub fn amount(&self) -> Option<u64> {
        self.callback.amount.parse().ok()
    }

    /// Canonical JSON of the payload, kept in the order's audit trail.
    pub fn audit_json(&self) -> String {
        serde_json::to_string(&self.callback).unwrap_or_default()
    }
}
