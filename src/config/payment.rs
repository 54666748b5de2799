//! Payment configuration

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;

/// Fondy hosted checkout endpoint.
pub const DEFAULT_CHECKOUT_URL: &str = "https://pay.fondy.eu/api/checkout/url/";

/// Payment configuration (Fondy merchant)
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Numeric merchant id issued by the provider
    pub merchant_id: i64,

    /// Merchant password; signs outbound requests and verifies callbacks
    pub merchant_password: SecretString,

    #[serde(default = "default_checkout_url")]
    pub checkout_url: String,

    /// Public URL of `/api/v1/callback/fondy`, sent with every checkout
    pub callback_url: Option<String>,

    /// Where the student lands after paying
    pub response_url: Option<String>,

    /// Checkout page language
    #[serde(default = "default_language")]
    pub language: String,

    /// Outbound request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl PaymentConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validate payment configuration
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.merchant_id <= 0 {
            return Err(ValidationError::InvalidMerchantId);
        }
        if self.merchant_password.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__MERCHANT_PASSWORD"));
        }
        if !is_http_url(&self.checkout_url) {
            return Err(ValidationError::InvalidUrl("PAYMENT__CHECKOUT_URL"));
        }
        if self.request_timeout_secs == 0 || self.request_timeout_secs > 120 {
            return Err(ValidationError::InvalidTimeout);
        }

        let urls = [
            ("PAYMENT__CALLBACK_URL", &self.callback_url),
            ("PAYMENT__RESPONSE_URL", &self.response_url),
        ];
        for (name, url) in urls {
            let Some(url) = url else { continue };
            if !is_http_url(url) {
                return Err(ValidationError::InvalidUrl(name));
            }
            if *environment == Environment::Production && !url.starts_with("https://") {
                return Err(ValidationError::UrlMustBeHttps(name));
            }
        }
        Ok(())
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            merchant_id: 0,
            merchant_password: SecretString::new(String::new()),
            checkout_url: default_checkout_url(),
            callback_url: None,
            response_url: None,
            language: default_language(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("https://") || url.starts_with("http://")
}

fn default_checkout_url() -> String {
    DEFAULT_CHECKOUT_URL.to_string()
}

fn default_language() -> String {
    "ru".to_string()
}

fn default_request_timeout() -> u64 {
    10
}
