//! FulfillmentWorker - Background service that retries deferred fulfillment.
//!
//! Every paid order enters the fulfillment backlog in the commit that marks it
//! paid. Settlement clears the entry when its follow-ups succeed; whatever is
//! left over is drained here:
//!
//! 1. Every `poll_interval`, take up to `batch_size` entries that are due
//! 2. Run [`ReconcileFulfillmentHandler::run_once`] over them
//! 3. Failed entries are rescheduled with backoff, or parked when exhausted
//!
//! ## Graceful Shutdown
//!
//! The worker listens on a `watch` channel and finishes one last pass
//! before stopping.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};

use crate::application::handlers::payment::{
    ReconcileFulfillmentHandler, ReconcileFulfillmentResult,
};
use crate::config::FulfillmentConfig;

#[derive(Debug, Clone)]
pub struct FulfillmentWorkerConfig {
    pub poll_interval: Duration,
}

impl Default for FulfillmentWorkerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(60),
        }
    }
}

impl From<&FulfillmentConfig> for FulfillmentWorkerConfig {
    fn from(config: &FulfillmentConfig) -> Self {
        Self {
            poll_interval: config.poll_interval(),
        }
    }
}

pub struct FulfillmentWorker {
    handler: Arc<ReconcileFulfillmentHandler>,
    config: FulfillmentWorkerConfig,
}

impl FulfillmentWorker {
    pub fn new(handler: Arc<ReconcileFulfillmentHandler>, config: FulfillmentWorkerConfig) -> Self {
        Self { handler, config }
    }

    /// Run the worker loop until the shutdown signal is received.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = time::interval(self.config.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            poll_interval_ms = self.config.poll_interval.as_millis() as u64,
            "Fulfillment worker started"
        );

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        self.tick().await;
                        tracing::info!("Fulfillment worker stopped");
                        return;
                    }
                }
                _ = interval.tick() => {
                    self.tick().await;
                }
            }
        }
    }

    /// One pass over the backlog. Errors are logged; the next tick retries.
    pub async fn tick(&self) -> Option<ReconcileFulfillmentResult> {
        match self.handler.run_once().await {
            Ok(result) => {
                if result.examined > 0 {
                    tracing::info!(
                        examined = result.examined,
                        completed = result.completed,
                        failed = result.failed,
                        parked = result.parked,
                        dropped = result.dropped,
                        "Fulfillment backlog pass finished"
                    );
                }
                Some(result)
            }
            Err(e) => {
                tracing::error!(error = %e, "Fulfillment backlog pass failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemoryAccessGrantor, InMemoryFulfillmentBacklog, InMemoryNotificationSender,
        InMemoryOfferCatalog, InMemoryOrderRepository,
    };
    use crate::application::handlers::payment::OrderFulfiller;
    use crate::domain::foundation::CourseId;
    use crate::domain::order::fixtures::created_order;
    use crate::domain::order::{Order, OrderStatus, Transaction};
    use crate::ports::{
        FulfillmentBacklog, OfferEntitlements, OrderRepository, PendingFulfillment,
    };

    struct Harness {
        orders: Arc<InMemoryOrderRepository>,
        backlog: Arc<InMemoryFulfillmentBacklog>,
        notifier: Arc<InMemoryNotificationSender>,
        handler: Arc<ReconcileFulfillmentHandler>,
    }

    async fn harness(order: &Order) -> Harness {
        let backlog = Arc::new(InMemoryFulfillmentBacklog::new());
        let orders = Arc::new(InMemoryOrderRepository::with_backlog(backlog.clone()));
        let offers = Arc::new(InMemoryOfferCatalog::new());
        let access = Arc::new(InMemoryAccessGrantor::new());
        let notifier = Arc::new(InMemoryNotificationSender::new());

        offers
            .insert_offer(OfferEntitlements {
                offer_id: order.offer.id,
                school_id: order.school_id,
                name: order.offer.name.clone(),
                amount: order.amount,
                currency: order.currency.clone(),
                course_ids: vec![CourseId::new()],
                module_ids: vec![],
            })
            .await;
        orders.create(order).await.unwrap();
        orders
            .transition_if_created(
                &order.id,
                OrderStatus::Paid,
                Transaction::new(OrderStatus::Paid, "{}"),
            )
            .await
            .unwrap();
        backlog
            .record(PendingFulfillment::new(order.id, false, "grant failed"))
            .await
            .unwrap();

        let fulfiller = Arc::new(OrderFulfiller::new(offers, access, notifier.clone()));
        let handler = Arc::new(ReconcileFulfillmentHandler::new(
            orders.clone(),
            backlog.clone(),
            fulfiller,
            10,
        ));
        Harness {
            orders,
            backlog,
            notifier,
            handler,
        }
    }

    #[tokio::test]
    async fn tick_drains_backlog() {
        let order = created_order();
        let h = harness(&order).await;
        let worker = FulfillmentWorker::new(h.handler.clone(), FulfillmentWorkerConfig::default());

        let result = worker.tick().await.unwrap();

        assert_eq!(result.completed, 1);
        assert!(h.backlog.get(&order.id).await.is_none());
        assert_eq!(h.notifier.sent().await.len(), 1);
        assert_eq!(h.orders.len().await, 1);
    }

    #[tokio::test]
    async fn run_processes_and_stops_on_shutdown_signal() {
        let order = created_order();
        let h = harness(&order).await;
        let worker = FulfillmentWorker::new(
            h.handler.clone(),
            FulfillmentWorkerConfig {
                poll_interval: Duration::from_millis(10),
            },
        );

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(async move { worker.run(shutdown_rx).await });

        tokio::time::sleep(Duration::from_millis(50)).await;
        shutdown_tx.send(true).unwrap();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("worker stops")
            .unwrap();

        assert!(h.backlog.get(&order.id).await.is_none());
        assert_eq!(h.notifier.sent().await.len(), 1);
    }

    #[test]
    fn config_from_section() {
        let section = FulfillmentConfig {
            poll_interval_secs: 15,
            ..Default::default()
        };
        assert_eq!(
            FulfillmentWorkerConfig::from(&section).poll_interval,
            Duration::from_secs(15)
        );
    }
}
