//! HTTP adapters - REST API implementations.

pub mod payment;

use std::time::Duration;

use axum::routing::get;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub use payment::{payment_routes, PaymentAppState};

/// The full API: payment routes under `/api/v1`, a health probe, request
/// tracing and a per-request timeout.
pub fn api_router(state: PaymentAppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .nest("/api/v1", payment_routes())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(request_timeout)),
        )
}
