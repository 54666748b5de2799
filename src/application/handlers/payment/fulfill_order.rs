//! Follow-ups owed to a paid order: access grant, then confirmation.

use std::sync::Arc;

use crate::domain::order::Order;
use crate::ports::{AccessGrantor, NotificationSender, OfferCatalog};

use super::confirmation_email::purchase_confirmation;

/// Where fulfillment stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FulfillmentFailure {
    /// Access was granted before the failure; only the e-mail is missing.
    pub access_granted: bool,
    pub reason: String,
}

impl FulfillmentFailure {
    fn before_grant(reason: impl Into<String>) -> Self {
        Self {
            access_granted: false,
            reason: reason.into(),
        }
    }

    fn after_grant(reason: impl Into<String>) -> Self {
        Self {
            access_granted: true,
            reason: reason.into(),
        }
    }
}

/// Grants an order's entitlements and sends its confirmation.
///
/// Grants are idempotent, so running this again after a failure is safe.
/// Pass `access_granted = true` to skip straight to the e-mail.
pub struct OrderFulfiller {
    offers: Arc<dyn OfferCatalog>,
    access: Arc<dyn AccessGrantor>,
    notifier: Arc<dyn NotificationSender>,
}

impl OrderFulfiller {
    pub fn new(
        offers: Arc<dyn OfferCatalog>,
        access: Arc<dyn AccessGrantor>,
        notifier: Arc<dyn NotificationSender>,
    ) -> Self {
        Self {
            offers,
            access,
            notifier,
        }
    }

    pub async fn fulfill(
        &self,
        order: &Order,
        access_granted: bool,
    ) -> Result<(), FulfillmentFailure> {
        if !access_granted {
            let entitlements = self
                .offers
                .find_entitlements(&order.offer.id)
                .await
                .map_err(|e| {
                    FulfillmentFailure::before_grant(format!("offer lookup failed: {}", e))
                })?
                .ok_or_else(|| {
                    FulfillmentFailure::before_grant(format!("offer {} not found", order.offer.id))
                })?;

            self.access
                .grant_access(
                    &order.student.id,
                    &entitlements.course_ids,
                    &entitlements.module_ids,
                )
                .await
                .map_err(|e| {
                    FulfillmentFailure::before_grant(format!("access grant failed: {}", e))
                })?;

            tracing::info!(
                order_id = %order.id,
                student_id = %order.student.id,
                courses = entitlements.course_ids.len(),
                modules = entitlements.module_ids.len(),
                "Access granted"
            );
        }

        self.notifier
            .send(&purchase_confirmation(order))
            .await
            .map_err(|e| FulfillmentFailure::after_grant(format!("confirmation failed: {}", e)))?;

        Ok(())
    }
}
