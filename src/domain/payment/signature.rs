//! Provider signature codec.
//!
//! Both inbound callbacks and outbound checkout requests are authenticated
//! with the same scheme:
//!
//! 1. Take every signed field (each payload type lists its own)
//! 2. Order them by field name, byte-wise ascending
//! 3. Drop empty text values; render integers in decimal
//! 4. Prepend the merchant secret, join with `|`
//! 5. SHA-1, lower-case hex

use std::collections::BTreeMap;

use sha1::{Digest, Sha1};
use subtle::ConstantTimeEq;

/// Token separator in the signature base string.
const SEPARATOR: &str = "|";

/// A single value contributing to a signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignedValue {
    Text(String),
    Integer(i64),
}

impl SignedValue {
    /// The token this value contributes, or `None` if it is omitted.
    fn token(&self) -> Option<String> {
        match self {
            SignedValue::Text(s) if s.is_empty() => None,
            SignedValue::Text(s) => Some(s.clone()),
            SignedValue::Integer(n) => Some(n.to_string()),
        }
    }
}

impl From<&str> for SignedValue {
    fn from(value: &str) -> Self {
        SignedValue::Text(value.to_string())
    }
}

impl From<&String> for SignedValue {
    fn from(value: &String) -> Self {
        SignedValue::Text(value.clone())
    }
}

impl From<i64> for SignedValue {
    fn from(value: i64) -> Self {
        SignedValue::Integer(value)
    }
}

/// Signed fields keyed by wire name. The map keeps them in signing order.
pub type SignedFields = BTreeMap<&'static str, SignedValue>;

/// A payload that carries a provider signature.
///
/// Implementors list their signed fields explicitly, leaving out the
/// signature itself and any other unsigned aid fields.
pub trait Signable {
    fn signed_fields(&self) -> SignedFields;
}

/// Builds the string that gets hashed.
pub fn signature_base(fields: &SignedFields, secret: &str) -> String {
    std::iter::once(secret.to_string())
        .chain(fields.values().filter_map(SignedValue::token))
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

/// Computes the lower-case hex SHA-1 signature.
pub fn sign(fields: &SignedFields, secret: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(signature_base(fields, secret).as_bytes());
    hex::encode(hasher.finalize())
}

/// Recomputes the signature and compares it in constant time.
pub fn verify(fields: &SignedFields, signature: &str, secret: &str) -> bool {
    let expected = sign(fields, secret);
    constant_time_compare(expected.as_bytes(), signature.as_bytes())
}

fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
