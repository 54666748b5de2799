//! Currency and price arithmetic for orders.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

/// ISO 4217 currency code, stored upper-case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    /// Creates a currency code, normalizing to upper case.
    pub fn new(code: impl AsRef<str>) -> Result<Self, ValidationError> {
        let code = code.as_ref().trim();
        if code.is_empty() {
            return Err(ValidationError::empty_field("currency"));
        }
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ValidationError::invalid_format(
                "currency",
                format!("'{}' is not a three-letter ISO code", code),
            ));
        }
        Ok(Self(code.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Currency {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Currency {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Currency> for String {
    fn from(value: Currency) -> Self {
        value.0
    }
}

/// Applies a whole-percent discount to an amount in minor units.
///
/// Rounds down, so a discount never charges more than the exact result.
pub fn discounted_amount(amount: u64, discount_percentage: u8) -> Result<u64, ValidationError> {
    if discount_percentage > 100 {
        return Err(ValidationError::out_of_range(
            "discount_percentage",
            0,
            100,
            i64::from(discount_percentage),
        ));
    }
    let kept = u128::from(100 - discount_percentage);
    Ok((u128::from(amount) * kept / 100) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_is_normalized_to_upper_case() {
        assert_eq!(Currency::new("uah").unwrap().as_str(), "UAH");
    }

    #[test]
    fn currency_rejects_bad_codes() {
        assert!(Currency::new("").is_err());
        assert!(Currency::new("US").is_err());
        assert!(Currency::new("US1").is_err());
        assert!(Currency::new("EURO").is_err());
    }

    #[test]
    fn currency_deserialization_validates() {
        assert!(serde_json::from_str::<Currency>("\"usd\"").is_ok());
        assert!(serde_json::from_str::<Currency>("\"dollars\"").is_err());
    }

    #[test]
    fn discount_rounds_down() {
        assert_eq!(discounted_amount(999, 10).unwrap(), 899);
        assert_eq!(discounted_amount(10_000, 25).unwrap(), 7_500);
    }

    #[test]
    fn discount_bounds() {
        assert_eq!(discounted_amount(5_000, 0).unwrap(), 5_000);
        assert_eq!(discounted_amount(5_000, 100).unwrap(), 0);
        assert!(discounted_amount(5_000, 101).is_err());
    }

    #[test]
    fn discount_does_not_overflow_on_large_amounts() {
        assert_eq!(discounted_amount(u64::MAX, 0).unwrap(), u64::MAX);
    }
}
