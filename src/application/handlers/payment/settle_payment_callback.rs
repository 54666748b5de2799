//! SettlePaymentCallbackHandler - Command handler for provider payment callbacks.
//!
//! # Flow
//!
//! 1. Authenticate the callback (nothing is read or written before this)
//! 2. Load the order; unknown ids are acknowledged and logged
//! 3. Commit the status through the store's atomic `transition_if_created`
//! 4. On a fresh `Paid` transition, grant access and send the confirmation
//!
//! The status write in step 3 is the commit point and enqueues a backlog
//! entry for a paid order in the same commit. Step 4 resolves that entry on
//! success and reschedules it on failure; it never fails the callback. If
//! the callback is abandoned between the two, reconciliation picks the entry
//! up once its grace period is over.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, OrderId, Timestamp};
use crate::domain::order::{Order, OrderStatus, Transaction};
use crate::domain::payment::{PaymentError, ValidatedCallback};
use crate::ports::{
    FulfillmentBacklog, OrderRepository, PaymentProvider, RetryPolicy, TransitionResult,
};

use super::fulfill_order::OrderFulfiller;

/// Command to settle one callback delivery.
#[derive(Debug, Clone)]
pub struct SettlePaymentCallbackCommand {
    /// Raw callback body.
    pub payload: Vec<u8>,
}

/// What happened to a paid order's follow-ups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fulfillment {
    /// Access granted and confirmation sent.
    Completed,
    /// Parked in the backlog for reconciliation.
    Deferred { reason: String },
    /// The order did not settle as paid.
    NotApplicable,
}

/// Result of settling a callback. Every variant is acknowledged to the
/// provider with 200.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettlementOutcome {
    /// The order left `Created`.
    Settled {
        order_id: OrderId,
        status: OrderStatus,
        fulfillment: Fulfillment,
    },
    /// The order was already terminal; only an audit record was added.
    Duplicate {
        order_id: OrderId,
        current: OrderStatus,
    },
    /// No such order. Nothing was written.
    UnknownOrder { order_id: OrderId },
}

/// Handler for provider payment callbacks.
pub struct SettlePaymentCallbackHandler {
    orders: Arc<dyn OrderRepository>,
    payment_provider: Arc<dyn PaymentProvider>,
    backlog: Arc<dyn FulfillmentBacklog>,
    fulfiller: Arc<OrderFulfiller>,
    retry_policy: RetryPolicy,
}

impl SettlePaymentCallbackHandler {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        payment_provider: Arc<dyn PaymentProvider>,
        backlog: Arc<dyn FulfillmentBacklog>,
        fulfiller: Arc<OrderFulfiller>,
    ) -> Self {
        Self {
            orders,
            payment_provider,
            backlog,
            fulfiller,
            retry_policy: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    pub async fn handle(
        &self,
        cmd: SettlePaymentCallbackCommand,
    ) -> Result<SettlementOutcome, PaymentError> {
        // 1. Authenticate
        let callback = self
            .payment_provider
            .verify_callback(&cmd.payload)
            .map_err(|e| {
                tracing::warn!(error = %e, "Rejected payment callback");
                e
            })?;
        let order_id = callback.order_id();

        // 2. Load
        let Some(order) = self.orders.find_by_id(&order_id).await.map_err(storage_fault)? else {
            tracing::warn!(
                order_id = %order_id,
                order_status = %callback.callback().order_status,
                "Payment callback for unknown order"
            );
            return Ok(SettlementOutcome::UnknownOrder { order_id });
        };
        check_amount(&order, &callback);

        // 3. Commit
        let target = callback.target_status();
        let transaction = Transaction::new(target, callback.audit_json());
        let result = self
            .orders
            .transition_if_created(&order_id, target, transaction)
            .await
            .map_err(storage_fault)?;

        match result {
            TransitionResult::Transitioned(order) => {
                tracing::info!(
                    order_id = %order_id,
                    status = %order.status,
                    provider_status = %callback.callback().order_status,
                    response_status = %callback.callback().response_status,
                    "Order settled"
                );

                // 4. Follow up
                let fulfillment = if order.status == OrderStatus::Paid {
                    self.fulfill(&order).await
                } else {
                    Fulfillment::NotApplicable
                };

                Ok(SettlementOutcome::Settled {
                    order_id,
                    status: order.status,
                    fulfillment,
                })
            }
            TransitionResult::AlreadyTerminal(order) => {
                tracing::info!(
                    order_id = %order_id,
                    status = %order.status,
                    provider_status = %callback.callback().order_status,
                    "Duplicate payment callback absorbed"
                );
                Ok(SettlementOutcome::Duplicate {
                    order_id,
                    current: order.status,
                })
            }
            TransitionResult::NotFound => {
                tracing::warn!(order_id = %order_id, "Order disappeared during settlement");
                Ok(SettlementOutcome::UnknownOrder { order_id })
            }
        }
    }

    async fn fulfill(&self, order: &Order) -> Fulfillment {
        let failure = match self.fulfiller.fulfill(order, false).await {
            Ok(()) => {
                if let Err(e) = self.backlog.resolve(&order.id).await {
                    tracing::warn!(
                        order_id = %order.id,
                        error = %e,
                        "Fulfilled order left in backlog; reconciliation will repeat its follow-ups"
                    );
                }
                return Fulfillment::Completed;
            }
            Err(failure) => failure,
        };

        tracing::error!(
            order_id = %order.id,
            access_granted = failure.access_granted,
            reason = %failure.reason,
            "Fulfillment deferred for paid order"
        );

        let retry_at = self.retry_policy.next_attempt_at(1, Timestamp::now());
        if let Err(e) = self
            .backlog
            .mark_attempt_failed(&order.id, failure.access_granted, &failure.reason, retry_at)
            .await
        {
            tracing::error!(
                order_id = %order.id,
                error = %e,
                "Could not reschedule deferred fulfillment; entry keeps its settlement defaults"
            );
        }

        Fulfillment::Deferred {
            reason: failure.reason,
        }
    }
}

/// The provider's status is authoritative; a mismatch is only flagged.
fn check_amount(order: &Order, callback: &ValidatedCallback) {
    if let Some(amount) = callback.amount() {
        if amount != order.amount {
            tracing::warn!(
                order_id = %order.id,
                expected = order.amount,
                reported = amount,
                "Callback amount differs from order amount"
            );
        }
    }
    let currency = &callback.callback().currency;
    if !currency.is_empty() && !currency.eq_ignore_ascii_case(order.currency.as_str()) {
        tracing::warn!(
            order_id = %order.id,
            expected = %order.currency,
            reported = %currency,
            "Callback currency differs from order currency"
        );
    }
}

fn storage_fault(err: DomainError) -> PaymentError {
    tracing::error!(error = %err, "Order store failure during settlement");
    PaymentError::StorageFault(err.to_string())
}
