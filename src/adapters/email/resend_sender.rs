//! Resend HTTP API implementation of `NotificationSender`.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::config::EmailConfig;
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{EmailMessage, NotificationSender};

#[derive(Debug, Clone)]
pub struct ResendConfig {
    api_key: SecretString,
    api_base_url: String,
    from: String,
    timeout: Duration,
}

impl ResendConfig {
    pub fn new(api_key: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            api_base_url: "https://api.resend.com".to_string(),
            from: from.into(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl From<&EmailConfig> for ResendConfig {
    fn from(config: &EmailConfig) -> Self {
        Self::new(config.resend_api_key.clone(), config.from_header())
            .with_base_url(config.api_base_url.clone())
    }
}

#[derive(Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

pub struct ResendNotificationSender {
    config: ResendConfig,
    http_client: reqwest::Client,
}

impl ResendNotificationSender {
    pub fn new(config: ResendConfig) -> Result<Self, DomainError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::InternalError,
                    format!("Failed to build HTTP client: {}", e),
                )
            })?;
        Ok(Self {
            config,
            http_client,
        })
    }
}

#[async_trait]
impl NotificationSender for ResendNotificationSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), DomainError> {
        let url = format!("{}/emails", self.config.api_base_url.trim_end_matches('/'));
        let body = SendEmailRequest {
            from: &self.config.from,
            to: [message.to.as_str()],
            subject: &message.subject,
            html: &message.body,
        };

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::ExternalServiceError,
                    format!("Resend request failed: {}", e),
                )
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(DomainError::new(
                ErrorCode::ExternalServiceError,
                format!("Resend API error {}: {}", status.as_u16(), error_text),
            ));
        }

        tracing::debug!(subject = %message.subject, "Email sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn message() -> EmailMessage {
        EmailMessage {
            to: "student@example.com".to_string(),
            subject: "Покупка прошла успешно!".to_string(),
            body: "<h1>Спасибо</h1>".to_string(),
        }
    }

    fn sender_for(server: &MockServer) -> ResendNotificationSender {
        let config = ResendConfig::new("re_test", "School <noreply@school.test>")
            .with_base_url(server.uri());
        ResendNotificationSender::new(config).unwrap()
    }

    #[test]
    fn config_from_email_section() {
        let section = EmailConfig {
            resend_api_key: "re_abc".to_string(),
            from_email: "school@example.com".to_string(),
            from_name: "School".to_string(),
            ..Default::default()
        };
        let config = ResendConfig::from(&section);
        assert_eq!(config.from, "School <school@example.com>");
        assert_eq!(config.api_base_url, "https://api.resend.com");
    }

    #[tokio::test]
    async fn posts_message_with_bearer_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/emails"))
            .and(header("authorization", "Bearer re_test"))
            .and(body_partial_json(json!({
                "from": "School <noreply@school.test>",
                "to": ["student@example.com"],
                "subject": "Покупка прошла успешно!"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "email_1"})))
            .expect(1)
            .mount(&server)
            .await;

        sender_for(&server).send(&message()).await.unwrap();
    }

    #[tokio::test]
    async fn api_error_is_external_service_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/emails"))
            .respond_with(ResponseTemplate::new(422).set_body_string("invalid from"))
            .mount(&server)
            .await;

        let err = sender_for(&server).send(&message()).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::ExternalServiceError);
        assert!(err.message.contains("422"));
    }
}
