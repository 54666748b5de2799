//! Application handlers.
//!
//! Command handlers that orchestrate domain operations.

pub mod payment;

pub use payment::{
    // Commands and results
    CreateOrderCommand,
    CreateOrderHandler,
    CreateOrderResult,
    GeneratePaymentLinkCommand,
    GeneratePaymentLinkHandler,
    GeneratePaymentLinkResult,
    ReconcileFulfillmentHandler,
    ReconcileFulfillmentResult,
    SettlePaymentCallbackCommand,
    SettlePaymentCallbackHandler,
    SettlementOutcome,
    // Fulfillment
    Fulfillment,
    FulfillmentFailure,
    OrderFulfiller,
    PaymentLinkSettings,
};
