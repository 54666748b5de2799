//! Payment domain module.
//!
//! Provider signature scheme, callback authentication, checkout wire types
//! and the payment error taxonomy.
//!
//! # Module Structure
//!
//! - `signature` - Signature codec shared by both directions
//! - `callback` - Callback payload and the validated wrapper
//! - `callback_verifier` - Authenticates raw callbacks
//! - `checkout` - Outbound checkout request/response
//! - `errors` - PaymentError with HTTP mapping

mod callback;
mod callback_verifier;
mod checkout;
mod errors;
pub mod signature;

pub use callback::{
    Callback, ProviderOrderStatus, ResponseCode, ValidatedCallback, RESPONSE_STATUS_SUCCESS,
};
pub use callback_verifier::CallbackVerifier;
pub use checkout::{
    ApiRequest, ApiResponse, CheckoutRequest, CheckoutResponse, GeneratePaymentLinkInput,
    DEFAULT_LANGUAGE,
};
pub use errors::PaymentError;
pub use signature::{Signable, SignedFields, SignedValue};

#[cfg(test)]
pub(crate) use callback::fixtures;
#[cfg(test)]
pub(crate) use callback_verifier::sign_test_callback;
