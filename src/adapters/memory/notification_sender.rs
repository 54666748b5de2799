//! Notification sender that keeps messages in memory.
//!
//! Used for local development and tests; nothing leaves the process.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::foundation::DomainError;
use crate::ports::{EmailMessage, NotificationSender};

#[derive(Default)]
pub struct InMemoryNotificationSender {
    sent: Mutex<Vec<EmailMessage>>,
}

impl InMemoryNotificationSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl NotificationSender for InMemoryNotificationSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), DomainError> {
        tracing::debug!(to = %message.to, subject = %message.subject, "Captured e-mail");
        self.sent.lock().await.push(message.clone());
        Ok(())
    }
}
