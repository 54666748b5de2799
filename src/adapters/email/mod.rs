//! Outbound e-mail adapters.

mod resend_sender;

pub use resend_sender::{ResendConfig, ResendNotificationSender};
