//! Callback signature verification.
//!
//! Authenticates provider callbacks against the merchant password before any
//! of their content is trusted.

use secrecy::{ExposeSecret, SecretString};

use crate::domain::foundation::OrderId;

use super::callback::{Callback, ValidatedCallback};
use super::errors::PaymentError;
use super::signature::{self, Signable};

/// Verifier for provider callbacks.
pub struct CallbackVerifier {
    /// Merchant password shared with the provider.
    secret: SecretString,
}

impl CallbackVerifier {
    pub fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    /// Parses a raw callback body and verifies its signature.
    ///
    /// # Verification Steps
    ///
    /// 1. Deserialize the JSON body into a [`Callback`]
    /// 2. Recompute the signature over the signed fields
    /// 3. Compare with the posted signature in constant time
    /// 4. Parse the order id
    ///
    /// # Errors
    ///
    /// - `MalformedPayload` - not JSON, a required field is missing or
    ///   mistyped, or the order id is not a UUID
    /// - `InvalidSignature` - signature does not match
    pub fn verify_and_parse(&self, payload: &[u8]) -> Result<ValidatedCallback, PaymentError> {
        let callback: Callback = serde_json::from_slice(payload)
            .map_err(|e| PaymentError::MalformedPayload(e.to_string()))?;
        self.verify(callback)
    }

    /// Verifies an already deserialized callback.
    pub fn verify(&self, callback: Callback) -> Result<ValidatedCallback, PaymentError> {
        let fields = callback.signed_fields();
        if !signature::verify(&fields, &callback.signature, self.secret.expose_secret()) {
            return Err(PaymentError::InvalidSignature);
        }

        let order_id: OrderId = callback.order_id.parse().map_err(|_| {
            PaymentError::MalformedPayload(format!("order_id '{}' is not a UUID", callback.order_id))
        })?;

        Ok(ValidatedCallback::new(order_id, callback))
    }
}

/// Signs a callback the way the provider would, for test fixtures.
#[cfg(test)]
pub fn sign_test_callback(callback: &mut Callback, secret: &str) {
    callback.signature = signature::sign(&callback.signed_fields(), secret);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::OrderStatus;
    use crate::domain::payment::callback::fixtures::approved_callback;

    const TEST_SECRET: &str = "test";

    fn verifier() -> CallbackVerifier {
        CallbackVerifier::new(SecretString::new(TEST_SECRET.to_string()))
    }

    fn signed_body(callback: &mut Callback) -> Vec<u8> {
        sign_test_callback(callback, TEST_SECRET);
        serde_json::to_vec(callback).unwrap()
    }

    // ══════════════════════════════════════════════════════════════
    // Happy Path
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn accepts_correctly_signed_callback() {
        let order_id = OrderId::new();
        let mut cb = approved_callback(order_id);
        let body = signed_body(&mut cb);

        let validated = verifier().verify_and_parse(&body).unwrap();
        assert_eq!(validated.order_id(), order_id);
        assert!(validated.is_success());
        assert!(validated.is_approved());
        assert_eq!(validated.target_status(), OrderStatus::Paid);
    }

    #[test]
    fn response_signature_string_is_not_signed() {
        let mut cb = approved_callback(OrderId::new());
        sign_test_callback(&mut cb, TEST_SECRET);
        cb.response_signature_string = "test|19900|...".to_string();

        assert!(verifier().verify(cb).is_ok());
    }

    #[test]
    fn unknown_extra_fields_are_ignored() {
        let mut cb = approved_callback(OrderId::new());
        sign_test_callback(&mut cb, TEST_SECRET);
        let mut value = serde_json::to_value(&cb).unwrap();
        value["parent_order_id"] = serde_json::json!("");
        let body = serde_json::to_vec(&value).unwrap();

        assert!(verifier().verify_and_parse(&body).is_ok());
    }

    // ══════════════════════════════════════════════════════════════
    // Forgery
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn tampered_field_is_rejected() {
        let mut cb = approved_callback(OrderId::new());
        sign_test_callback(&mut cb, TEST_SECRET);
        cb.amount = "1".to_string();

        assert!(matches!(
            verifier().verify(cb),
            Err(PaymentError::InvalidSignature)
        ));
    }

    #[test]
    fn declined_callback_replayed_as_approved_is_rejected() {
        let mut cb = approved_callback(OrderId::new());
        cb.order_status = "declined".to_string();
        sign_test_callback(&mut cb, TEST_SECRET);
        cb.order_status = "approved".to_string();

        assert!(matches!(
            verifier().verify(cb),
            Err(PaymentError::InvalidSignature)
        ));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let mut cb = approved_callback(OrderId::new());
        sign_test_callback(&mut cb, "other-merchant");

        assert!(matches!(
            verifier().verify(cb),
            Err(PaymentError::InvalidSignature)
        ));
    }

    #[test]
    fn empty_signature_is_rejected() {
        let cb = approved_callback(OrderId::new());
        assert!(matches!(
            verifier().verify(cb),
            Err(PaymentError::InvalidSignature)
        ));
    }

    // ══════════════════════════════════════════════════════════════
    // Malformed Payloads
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn non_json_is_malformed() {
        assert!(matches!(
            verifier().verify_and_parse(b"order_id=1&signature=x"),
            Err(PaymentError::MalformedPayload(_))
        ));
    }

    #[test]
    fn missing_signature_is_malformed() {
        let body = br#"{"order_id":"x","merchant_id":1,"order_status":"approved","response_status":"success"}"#;
        assert!(matches!(
            verifier().verify_and_parse(body),
            Err(PaymentError::MalformedPayload(_))
        ));
    }

    #[test]
    fn signed_non_uuid_order_id_is_malformed() {
        let mut cb = approved_callback(OrderId::new());
        cb.order_id = "order-42".to_string();
        sign_test_callback(&mut cb, TEST_SECRET);

        assert!(matches!(
            verifier().verify(cb),
            Err(PaymentError::MalformedPayload(_))
        ));
    }
}
