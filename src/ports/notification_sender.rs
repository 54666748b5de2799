//! Notification sender port.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;

/// A rendered e-mail ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    /// HTML body.
    pub body: String,
}

/// Port for delivering e-mail to students.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// # Errors
    ///
    /// - `ExternalServiceError` if the mail service rejects or is unreachable
    async fn send(&self, message: &EmailMessage) -> Result<(), DomainError>;
}
