//! Request and response bodies for the payment endpoints.

use serde::{Deserialize, Serialize};

use crate::application::handlers::payment::{
    CreateOrderResult, Fulfillment, GeneratePaymentLinkResult, ReconcileFulfillmentResult,
    SettlementOutcome,
};
use crate::domain::foundation::OfferId;
use crate::domain::order::OrderStatus;

/// POST /api/v1/orders
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderRequest {
    pub offer_id: OfferId,
    #[serde(default)]
    pub promo_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderResponse {
    pub order_id: String,
    pub amount: u64,
    pub currency: String,
    pub checkout_url: String,
}

impl From<CreateOrderResult> for CreateOrderResponse {
    fn from(result: CreateOrderResult) -> Self {
        Self {
            order_id: result.order_id.to_string(),
            amount: result.amount,
            currency: result.currency,
            checkout_url: result.checkout_url,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentLinkResponse {
    pub order_id: String,
    pub checkout_url: String,
}

impl From<GeneratePaymentLinkResult> for PaymentLinkResponse {
    fn from(result: GeneratePaymentLinkResult) -> Self {
        Self {
            order_id: result.order_id.to_string(),
            checkout_url: result.checkout_url,
        }
    }
}

/// Acknowledgement returned to the provider for an accepted callback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallbackAck {
    /// `settled`, `duplicate` or `unknown_order`
    pub outcome: String,
    pub order_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fulfillment: Option<String>,
}

impl From<SettlementOutcome> for CallbackAck {
    fn from(outcome: SettlementOutcome) -> Self {
        match outcome {
            SettlementOutcome::Settled {
                order_id,
                status,
                fulfillment,
            } => Self {
                outcome: "settled".to_string(),
                order_id: order_id.to_string(),
                status: Some(status),
                fulfillment: Some(
                    match fulfillment {
                        Fulfillment::Completed => "completed",
                        Fulfillment::Deferred { .. } => "deferred",
                        Fulfillment::NotApplicable => "not_applicable",
                    }
                    .to_string(),
                ),
            },
            SettlementOutcome::Duplicate { order_id, current } => Self {
                outcome: "duplicate".to_string(),
                order_id: order_id.to_string(),
                status: Some(current),
                fulfillment: None,
            },
            SettlementOutcome::UnknownOrder { order_id } => Self {
                outcome: "unknown_order".to_string(),
                order_id: order_id.to_string(),
                status: None,
                fulfillment: None,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileResponse {
    pub examined: usize,
    pub completed: usize,
    pub failed: usize,
    pub parked: usize,
    pub dropped: usize,
}

impl From<ReconcileFulfillmentResult> for ReconcileResponse {
    fn from(result: ReconcileFulfillmentResult) -> Self {
        Self {
            examined: result.examined,
            completed: result.completed,
            failed: result.failed,
            parked: result.parked,
            dropped: result.dropped,
        }
    }
}

/// Error body for every failed request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}
