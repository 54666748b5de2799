//! Payment provider port for external payment processing.
//!
//! Defines the contract for the hosted-checkout gateway.
//!
//! # Design
//!
//! - **Two directions**: outbound link generation and inbound callback
//!   authentication share the merchant credentials, so both live here
//! - **Authenticated by type**: `verify_callback` is the only way to obtain
//!   a [`ValidatedCallback`]

use async_trait::async_trait;

use crate::domain::payment::{GeneratePaymentLinkInput, PaymentError, ValidatedCallback};

/// Port for payment provider integrations.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Create a hosted checkout for an order and return its URL.
    ///
    /// # Errors
    ///
    /// - `ProviderError { transient: true }` on timeouts and transport failures
    /// - `ProviderError { transient: false }` when the provider refuses the
    ///   request; the message is the provider's error text
    async fn generate_payment_link(
        &self,
        input: GeneratePaymentLinkInput,
    ) -> Result<String, PaymentError>;

    /// Verify a raw callback body and parse it.
    ///
    /// # Errors
    ///
    /// - `MalformedPayload` if the body does not have the callback shape
    /// - `InvalidSignature` if the signature does not match
    fn verify_callback(&self, payload: &[u8]) -> Result<ValidatedCallback, PaymentError>;
}
