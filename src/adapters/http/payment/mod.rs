//! HTTP adapter for payment endpoints.
//!
//! - `POST /api/v1/callback/fondy` - Settle a provider callback
//! - `POST /api/v1/orders` - Create an order and its checkout link
//! - `POST /api/v1/orders/:order_id/payment-link` - Re-issue a checkout link
//! - `POST /api/v1/admin/fulfillment/reconcile` - Retry deferred fulfillment

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::{ApiError, PaymentAppState, StudentContext};
pub use routes::payment_routes;
