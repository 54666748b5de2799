//! Payment error types.
//!
//! Covers callback verification, settlement and payment-link generation,
//! with HTTP status code mapping and retryability semantics.

use http::StatusCode;
use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, OfferId, OrderId, ValidationError};
use crate::domain::order::OrderStatus;

/// Errors that occur while taking or settling a payment.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Callback body is not JSON, misses required fields, or has wrong types.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// Callback signature does not match the payload.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Referenced order does not exist.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// Referenced offer does not exist in the school.
    #[error("Offer not found: {0}")]
    OfferNotFound(OfferId),

    /// Operation is not allowed in the order's current status.
    #[error("Order {order_id} is {status}, expected created")]
    InvalidState { order_id: OrderId, status: OrderStatus },

    /// Outbound call to the payment provider failed or was refused.
    #[error("Payment provider error: {message}")]
    ProviderError { message: String, transient: bool },

    /// Persistence failed.
    #[error("Storage fault: {0}")]
    StorageFault(String),

    /// Caller input failed validation.
    #[error("Validation failed for '{field}': {message}")]
    Validation { field: String, message: String },
}

impl PaymentError {
    pub fn provider(message: impl Into<String>) -> Self {
        PaymentError::ProviderError {
            message: message.into(),
            transient: false,
        }
    }

    pub fn provider_transient(message: impl Into<String>) -> Self {
        PaymentError::ProviderError {
            message: message.into(),
            transient: true,
        }
    }

    /// Returns true if the same request may succeed later.
    pub fn is_retryable(&self) -> bool {
        match self {
            PaymentError::StorageFault(_) => true,
            PaymentError::ProviderError { transient, .. } => *transient,
            _ => false,
        }
    }

    /// Maps the error to an HTTP status code.
    ///
    /// For callbacks the provider redelivers on 5xx and gives up on 4xx.
    pub fn status_code(&self) -> StatusCode {
        match self {
            PaymentError::MalformedPayload(_) | PaymentError::Validation { .. } => {
                StatusCode::BAD_REQUEST
            }
            PaymentError::InvalidSignature => StatusCode::UNAUTHORIZED,
            PaymentError::OrderNotFound(_) | PaymentError::OfferNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            PaymentError::InvalidState { .. } => StatusCode::CONFLICT,
            PaymentError::ProviderError { .. } => StatusCode::BAD_GATEWAY,
            PaymentError::StorageFault(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            PaymentError::MalformedPayload(_) => "MALFORMED_PAYLOAD",
            PaymentError::InvalidSignature => "INVALID_SIGNATURE",
            PaymentError::OrderNotFound(_) => "ORDER_NOT_FOUND",
            PaymentError::OfferNotFound(_) => "OFFER_NOT_FOUND",
            PaymentError::InvalidState { .. } => "INVALID_STATE",
            PaymentError::ProviderError { .. } => "PROVIDER_ERROR",
            PaymentError::StorageFault(_) => "STORAGE_FAULT",
            PaymentError::Validation { .. } => "VALIDATION_FAILED",
        }
    }
}

impl From<DomainError> for PaymentError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ValidationFailed => PaymentError::Validation {
                field: err.details.get("field").cloned().unwrap_or_default(),
                message: err.message,
            },
            ErrorCode::ExternalServiceError => PaymentError::provider(err.message),
            _ => PaymentError::StorageFault(err.to_string()),
        }
    }
}

impl From<ValidationError> for PaymentError {
    fn from(err: ValidationError) -> Self {
        PaymentError::Validation {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}
