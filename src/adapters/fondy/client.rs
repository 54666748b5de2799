//! Fondy HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::config::{PaymentConfig, DEFAULT_CHECKOUT_URL};
use crate::domain::payment::{
    ApiRequest, ApiResponse, CallbackVerifier, CheckoutRequest, GeneratePaymentLinkInput,
    PaymentError, ValidatedCallback, DEFAULT_LANGUAGE,
};
use crate::ports::PaymentProvider;

/// User-Agent Fondy sends with server callbacks.
///
/// Informational only: callbacks are authenticated by signature.
pub const FONDY_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64; Twisted) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/63.0.3239.108 Safari/537.36";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Merchant credentials and endpoint settings.
#[derive(Debug, Clone)]
pub struct FondyConfig {
    merchant_id: i64,
    merchant_password: SecretString,
    checkout_url: String,
    language: String,
    timeout: Duration,
}

impl FondyConfig {
    pub fn new(merchant_id: i64, merchant_password: impl Into<String>) -> Self {
        Self {
            merchant_id,
            merchant_password: SecretString::new(merchant_password.into()),
            checkout_url: DEFAULT_CHECKOUT_URL.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set a custom checkout endpoint (for testing).
    pub fn with_checkout_url(mut self, url: impl Into<String>) -> Self {
        self.checkout_url = url.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl From<&PaymentConfig> for FondyConfig {
    fn from(config: &PaymentConfig) -> Self {
        Self {
            merchant_id: config.merchant_id,
            merchant_password: config.merchant_password.clone(),
            checkout_url: config.checkout_url.clone(),
            language: config.language.clone(),
            timeout: config.request_timeout(),
        }
    }
}

/// Fondy payment provider adapter.
pub struct FondyClient {
    config: FondyConfig,
    verifier: CallbackVerifier,
    http_client: reqwest::Client,
}

impl FondyClient {
    /// Create a client; every outbound request is bounded by the configured timeout.
    pub fn new(config: FondyConfig) -> Result<Self, PaymentError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PaymentError::provider(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            verifier: CallbackVerifier::new(config.merchant_password.clone()),
            config,
            http_client,
        })
    }
}

fn transport_error(err: reqwest::Error) -> PaymentError {
    if err.is_timeout() {
        PaymentError::provider_transient("Checkout request timed out")
    } else {
        PaymentError::provider_transient(format!("Checkout request failed: {}", err))
    }
}

#[async_trait]
impl PaymentProvider for FondyClient {
    async fn generate_payment_link(
        &self,
        input: GeneratePaymentLinkInput,
    ) -> Result<String, PaymentError> {
        let request = CheckoutRequest::signed(
            &input,
            self.config.merchant_id,
            &self.config.language,
            self.config.merchant_password.expose_secret(),
        );

        let response = self
            .http_client
            .post(&self.config.checkout_url)
            .json(&ApiRequest { request: &request })
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                order_id = %input.order_id,
                status = status.as_u16(),
                body = %body,
                "Fondy checkout returned HTTP error"
            );
            let message = format!("Fondy returned HTTP {}", status.as_u16());
            return Err(if status.is_server_error() {
                PaymentError::provider_transient(message)
            } else {
                PaymentError::provider(message)
            });
        }

        let body: ApiResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                transport_error(e)
            } else {
                PaymentError::provider(format!("Failed to parse Fondy response: {}", e))
            }
        })?;
        let reply = body.response;

        if !reply.is_success() {
            tracing::warn!(
                order_id = %input.order_id,
                error_code = ?reply.error_code,
                error_message = %reply.error_message,
                "Fondy refused checkout request"
            );
            if reply.error_message.is_empty() {
                return Err(PaymentError::provider(format!(
                    "Fondy response_status '{}'",
                    reply.response_status
                )));
            }
            return Err(PaymentError::provider(reply.error_message));
        }
        if reply.checkout_url.is_empty() {
            return Err(PaymentError::provider("Fondy response has no checkout_url"));
        }

        tracing::debug!(
            order_id = %input.order_id,
            payment_id = %reply.payment_id,
            "Checkout link generated"
        );
        Ok(reply.checkout_url)
    }

    fn verify_callback(&self, payload: &[u8]) -> Result<ValidatedCallback, PaymentError> {
        self.verifier.verify_and_parse(payload)
    }
}
