//! Payment handlers.
//!
//! Command handlers for the purchase flow:
//!
//! ## Commands
//! - Creating an order and its checkout link
//! - Re-issuing a checkout link for an unpaid order
//! - Settling a provider callback (verify, transition, fulfill)
//! - Retrying deferred fulfillment of paid orders

mod confirmation_email;
mod create_order;
mod fulfill_order;
mod generate_payment_link;
mod reconcile_fulfillment;
mod settle_payment_callback;

#[cfg(test)]
mod test_support;

pub use confirmation_email::{purchase_confirmation, PURCHASE_CONFIRMATION_SUBJECT};
pub use create_order::{CreateOrderCommand, CreateOrderHandler, CreateOrderResult};
pub use fulfill_order::{FulfillmentFailure, OrderFulfiller};
pub use generate_payment_link::{
    GeneratePaymentLinkCommand, GeneratePaymentLinkHandler, GeneratePaymentLinkResult,
    PaymentLinkSettings,
};
pub use reconcile_fulfillment::{ReconcileFulfillmentHandler, ReconcileFulfillmentResult};
pub use settle_payment_callback::{
    Fulfillment, SettlePaymentCallbackCommand, SettlePaymentCallbackHandler, SettlementOutcome,
};
