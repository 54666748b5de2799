//! ReconcileFulfillmentHandler - Retries deferred fulfillment of paid orders.
//!
//! Each pass takes the entries that are due, earliest first. A failed entry
//! is pushed back by the [`RetryPolicy`] and parked once its attempts are
//! exhausted, so one broken order cannot hold the front of the queue.

use std::sync::Arc;

use crate::domain::foundation::Timestamp;
use crate::domain::order::OrderStatus;
use crate::domain::payment::PaymentError;
use crate::ports::{FulfillmentBacklog, OrderRepository, RetryPolicy};

use super::fulfill_order::OrderFulfiller;

/// Counts from one pass over the backlog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileFulfillmentResult {
    pub examined: usize,
    pub completed: usize,
    /// Failed and rescheduled.
    pub failed: usize,
    /// Failed for the last allowed time and parked for operators.
    pub parked: usize,
    /// Entries whose order is gone or no longer paid.
    pub dropped: usize,
}

pub struct ReconcileFulfillmentHandler {
    orders: Arc<dyn OrderRepository>,
    backlog: Arc<dyn FulfillmentBacklog>,
    fulfiller: Arc<OrderFulfiller>,
    batch_size: usize,
    retry_policy: RetryPolicy,
}

impl ReconcileFulfillmentHandler {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        backlog: Arc<dyn FulfillmentBacklog>,
        fulfiller: Arc<OrderFulfiller>,
        batch_size: usize,
    ) -> Self {
        Self {
            orders,
            backlog,
            fulfiller,
            batch_size,
            retry_policy: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    /// Processes the entries due now.
    pub async fn run_once(&self) -> Result<ReconcileFulfillmentResult, PaymentError> {
        self.run_due(Timestamp::now()).await
    }

    /// Processes up to `batch_size` entries due by `now`.
    pub async fn run_due(&self, now: Timestamp) -> Result<ReconcileFulfillmentResult, PaymentError> {
        let entries = self
            .backlog
            .pending(self.batch_size, now)
            .await
            .map_err(|e| PaymentError::StorageFault(e.to_string()))?;

        let mut result = ReconcileFulfillmentResult {
            examined: entries.len(),
            ..Default::default()
        };

        for entry in entries {
            let order = match self.orders.find_by_id(&entry.order_id).await {
                Ok(order) => order,
                Err(e) => {
                    tracing::warn!(order_id = %entry.order_id, error = %e, "Order lookup failed");
                    result.failed += 1;
                    continue;
                }
            };

            let Some(order) = order.filter(|o| o.status == OrderStatus::Paid) else {
                tracing::warn!(order_id = %entry.order_id, "Dropping backlog entry for unpaid order");
                self.backlog
                    .resolve(&entry.order_id)
                    .await
                    .map_err(|e| PaymentError::StorageFault(e.to_string()))?;
                result.dropped += 1;
                continue;
            };

            let attempts = entry.attempts + 1;
            match self.fulfiller.fulfill(&order, entry.access_granted).await {
                Ok(()) => {
                    self.backlog
                        .resolve(&order.id)
                        .await
                        .map_err(|e| PaymentError::StorageFault(e.to_string()))?;
                    tracing::info!(order_id = %order.id, attempts, "Deferred fulfillment completed");
                    result.completed += 1;
                }
                Err(failure) => {
                    let retry_at = self.retry_policy.next_attempt_at(attempts, now);
                    self.backlog
                        .mark_attempt_failed(
                            &order.id,
                            failure.access_granted,
                            &failure.reason,
                            retry_at,
                        )
                        .await
                        .map_err(|e| PaymentError::StorageFault(e.to_string()))?;

                    match retry_at {
                        Some(retry_at) => {
                            tracing::warn!(
                                order_id = %order.id,
                                attempts,
                                reason = %failure.reason,
                                retry_at = %retry_at.as_datetime(),
                                "Deferred fulfillment failed again"
                            );
                            result.failed += 1;
                        }
                        None => {
                            tracing::error!(
                                order_id = %order.id,
                                attempts,
                                reason = %failure.reason,
                                "Deferred fulfillment parked; manual follow-up required"
                            );
                            result.parked += 1;
                        }
                    }
                }
            }
        }

        Ok(result)
    }
}
