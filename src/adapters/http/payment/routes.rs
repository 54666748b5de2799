//! Axum router configuration for payment endpoints.

use axum::routing::post;
use axum::Router;

use super::handlers::{
    create_order, fondy_callback, generate_payment_link, reconcile_fulfillment, PaymentAppState,
};

/// Create the payment API router, to be nested under `/api/v1`.
///
/// # Routes
///
/// ## Provider (no session, signature verified)
/// - `POST /callback/fondy`
///
/// ## Student (identity from `X-Student-*` / `X-School-Id` headers)
/// - `POST /orders`
/// - `POST /orders/:order_id/payment-link`
///
/// ## Admin
/// - `POST /admin/fulfillment/reconcile`
pub fn payment_routes() -> Router<PaymentAppState> {
    Router::new()
        .route("/callback/fondy", post(fondy_callback))
        .route("/orders", post(create_order))
        .route("/orders/:order_id/payment-link", post(generate_payment_link))
        .route("/admin/fulfillment/reconcile", post(reconcile_fulfillment))
}
