//! HTTP handlers for payment endpoints.
//!
//! These handlers connect Axum routes to the payment command handlers.

use std::sync::Arc;

use axum::async_trait;
use axum::body::Bytes;
use axum::extract::{FromRequestParts, Json, Path, State};
use axum::http::request::Parts;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::adapters::fondy::FONDY_USER_AGENT;
use crate::application::handlers::payment::{
    CreateOrderCommand, CreateOrderHandler, GeneratePaymentLinkCommand,
    GeneratePaymentLinkHandler, OrderFulfiller, PaymentLinkSettings, ReconcileFulfillmentHandler,
    SettlePaymentCallbackCommand, SettlePaymentCallbackHandler,
};
use crate::domain::foundation::{OrderId, SchoolId, StudentId};
use crate::domain::order::StudentSnapshot;
use crate::domain::payment::PaymentError;
use crate::ports::{
    FulfillmentBacklog, OfferCatalog, OrderRepository, PaymentProvider, RetryPolicy,
};

use super::dto::{
    CallbackAck, CreateOrderRequest, CreateOrderResponse, ErrorResponse, PaymentLinkResponse,
    ReconcileResponse,
};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for the payment endpoints.
#[derive(Clone)]
pub struct PaymentAppState {
    pub orders: Arc<dyn OrderRepository>,
    pub offers: Arc<dyn OfferCatalog>,
    pub payment_provider: Arc<dyn PaymentProvider>,
    pub backlog: Arc<dyn FulfillmentBacklog>,
    pub fulfiller: Arc<OrderFulfiller>,
    pub link_settings: PaymentLinkSettings,
    pub reconcile_batch_size: usize,
    pub retry_policy: RetryPolicy,
}

impl PaymentAppState {
    pub fn settle_handler(&self) -> SettlePaymentCallbackHandler {
        SettlePaymentCallbackHandler::new(
            self.orders.clone(),
            self.payment_provider.clone(),
            self.backlog.clone(),
            self.fulfiller.clone(),
        )
        .with_retry_policy(self.retry_policy)
    }

    pub fn create_order_handler(&self) -> CreateOrderHandler {
        CreateOrderHandler::new(
            self.orders.clone(),
            self.offers.clone(),
            self.payment_provider.clone(),
            self.link_settings.clone(),
        )
    }

    pub fn payment_link_handler(&self) -> GeneratePaymentLinkHandler {
        GeneratePaymentLinkHandler::new(
            self.orders.clone(),
            self.payment_provider.clone(),
            self.link_settings.clone(),
        )
    }

    pub fn reconcile_handler(&self) -> ReconcileFulfillmentHandler {
        ReconcileFulfillmentHandler::new(
            self.orders.clone(),
            self.backlog.clone(),
            self.fulfiller.clone(),
            self.reconcile_batch_size,
        )
        .with_retry_policy(self.retry_policy)
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Student Context (stands in for the session layer)
// ════════════════════════════════════════════════════════════════════════════════

pub const STUDENT_ID_HEADER: &str = "X-Student-Id";
pub const STUDENT_NAME_HEADER: &str = "X-Student-Name";
pub const STUDENT_EMAIL_HEADER: &str = "X-Student-Email";
pub const SCHOOL_ID_HEADER: &str = "X-School-Id";

/// The student making the request, taken from request headers.
#[derive(Debug, Clone)]
pub struct StudentContext {
    pub school_id: SchoolId,
    pub student: StudentSnapshot,
}

/// Rejection type for StudentContext extraction.
pub struct StudentRequired(&'static str);

impl IntoResponse for StudentRequired {
    fn into_response(self) -> Response {
        let error = ErrorResponse::new(
            "STUDENT_REQUIRED",
            format!("Missing or invalid {} header", self.0),
        );
        (StatusCode::UNAUTHORIZED, Json(error)).into_response()
    }
}

fn header_str<'a>(parts: &'a Parts, name: &'static str) -> Option<&'a str> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

#[async_trait]
impl<S> FromRequestParts<S> for StudentContext
where
    S: Send + Sync,
{
    type Rejection = StudentRequired;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let school_id: SchoolId = header_str(parts, SCHOOL_ID_HEADER)
            .and_then(|s| s.parse().ok())
            .ok_or(StudentRequired(SCHOOL_ID_HEADER))?;
        let student_id: StudentId = header_str(parts, STUDENT_ID_HEADER)
            .and_then(|s| s.parse().ok())
            .ok_or(StudentRequired(STUDENT_ID_HEADER))?;
        let email = header_str(parts, STUDENT_EMAIL_HEADER)
            .ok_or(StudentRequired(STUDENT_EMAIL_HEADER))?;
        let name = header_str(parts, STUDENT_NAME_HEADER).unwrap_or_default();

        Ok(StudentContext {
            school_id,
            student: StudentSnapshot {
                id: student_id,
                name: name.to_string(),
                email: email.to_string(),
            },
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/v1/callback/fondy - Settle a provider callback
///
/// Settled, duplicate and unknown-order outcomes are all acknowledged with
/// 200 so the provider stops redelivering.
pub async fn fondy_callback(
    State(state): State<PaymentAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if user_agent != FONDY_USER_AGENT {
        tracing::warn!(user_agent = %user_agent, "Callback with unexpected User-Agent");
    }

    let outcome = state
        .settle_handler()
        .handle(SettlePaymentCallbackCommand {
            payload: body.to_vec(),
        })
        .await?;

    Ok((StatusCode::OK, Json(CallbackAck::from(outcome))))
}

/// POST /api/v1/orders - Create an order and its checkout link
pub async fn create_order(
    State(state): State<PaymentAppState>,
    ctx: StudentContext,
    Json(request): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .create_order_handler()
        .handle(CreateOrderCommand {
            school_id: ctx.school_id,
            student: ctx.student,
            offer_id: request.offer_id,
            promo_code: request.promo_code,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(CreateOrderResponse::from(result))))
}

/// POST /api/v1/orders/:order_id/payment-link - Re-issue a checkout link
pub async fn generate_payment_link(
    State(state): State<PaymentAppState>,
    ctx: StudentContext,
    Path(order_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let order_id: OrderId = order_id.parse().map_err(|_| PaymentError::Validation {
        field: "order_id".to_string(),
        message: format!("'{}' is not a valid order id", order_id),
    })?;

    let result = state
        .payment_link_handler()
        .handle(GeneratePaymentLinkCommand {
            order_id,
            student_id: ctx.student.id,
        })
        .await?;

    Ok(Json(PaymentLinkResponse::from(result)))
}

/// POST /api/v1/admin/fulfillment/reconcile - Run one backlog pass
pub async fn reconcile_fulfillment(
    State(state): State<PaymentAppState>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state.reconcile_handler().run_once().await?;
    Ok(Json(ReconcileResponse::from(result)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts payment errors to HTTP responses.
#[derive(Debug)]
pub struct ApiError(PaymentError);

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        let message = match &self.0 {
            PaymentError::StorageFault(detail) => {
                tracing::error!(error = %detail, "Storage fault while handling request");
                "Internal error, please retry".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorResponse::new(self.0.code(), message);
        (status, Json(body)).into_response()
    }
}
