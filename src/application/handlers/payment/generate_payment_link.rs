//! GeneratePaymentLinkHandler - Command handler for (re)issuing a checkout link.

use std::sync::Arc;

use crate::domain::foundation::{OrderId, StudentId};
use crate::domain::order::Order;
use crate::domain::payment::{GeneratePaymentLinkInput, PaymentError};
use crate::ports::{OrderRepository, PaymentProvider};

/// Where the provider should send the student and the callback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentLinkSettings {
    pub callback_url: Option<String>,
    pub response_url: Option<String>,
}

impl PaymentLinkSettings {
    /// Builds the provider input for an order.
    pub fn input_for(&self, order: &Order) -> GeneratePaymentLinkInput {
        GeneratePaymentLinkInput {
            order_id: order.id,
            amount: order.amount,
            currency: order.currency.clone(),
            order_desc: order.offer.name.clone(),
            callback_url: self.callback_url.clone(),
            response_url: self.response_url.clone(),
            sender_email: Some(order.student.email.clone()).filter(|e| !e.is_empty()),
        }
    }
}

/// Command to issue a checkout link for an existing order.
#[derive(Debug, Clone)]
pub struct GeneratePaymentLinkCommand {
    pub order_id: OrderId,
    /// The caller; must own the order.
    pub student_id: StudentId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratePaymentLinkResult {
    pub order_id: OrderId,
    pub checkout_url: String,
}

/// Handler for issuing checkout links.
pub struct GeneratePaymentLinkHandler {
    orders: Arc<dyn OrderRepository>,
    payment_provider: Arc<dyn PaymentProvider>,
    settings: PaymentLinkSettings,
}

impl GeneratePaymentLinkHandler {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        payment_provider: Arc<dyn PaymentProvider>,
        settings: PaymentLinkSettings,
    ) -> Self {
        Self {
            orders,
            payment_provider,
            settings,
        }
    }

    pub async fn handle(
        &self,
        cmd: GeneratePaymentLinkCommand,
    ) -> Result<GeneratePaymentLinkResult, PaymentError> {
        let order = self
            .orders
            .find_by_id(&cmd.order_id)
            .await?
            .filter(|o| o.student.id == cmd.student_id)
            .ok_or(PaymentError::OrderNotFound(cmd.order_id))?;

        if !order.is_awaiting_payment() {
            return Err(PaymentError::InvalidState {
                order_id: order.id,
                status: order.status,
            });
        }

        let checkout_url = self
            .payment_provider
            .generate_payment_link(self.settings.input_for(&order))
            .await
            .map_err(|e| {
                tracing::warn!(order_id = %order.id, error = %e, "Payment link generation failed");
                e
            })?;

        Ok(GeneratePaymentLinkResult {
            order_id: order.id,
            checkout_url,
        })
    }
}
