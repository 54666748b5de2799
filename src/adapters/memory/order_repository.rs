//! In-memory order repository.
//!
//! A single write lock around the map makes `transition_if_created` atomic,
//! matching the compare-and-swap the PostgreSQL adapter does in SQL. The
//! backlog entry for a paid order is enqueued before that lock is released.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, OrderId};
use crate::domain::order::{Order, OrderStatus, Transaction, TransitionOutcome};
use crate::ports::{OrderRepository, PendingFulfillment, TransitionResult};

use super::InMemoryFulfillmentBacklog;

#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: RwLock<HashMap<OrderId, Order>>,
    backlog: Arc<InMemoryFulfillmentBacklog>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository that enqueues paid orders into a shared backlog.
    pub fn with_backlog(backlog: Arc<InMemoryFulfillmentBacklog>) -> Self {
        Self {
            orders: RwLock::default(),
            backlog,
        }
    }

    /// Number of stored orders.
    pub async fn len(&self) -> usize {
        self.orders.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.orders.read().await.is_empty()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn create(&self, order: &Order) -> Result<(), DomainError> {
        let mut orders = self.orders.write().await;
        if orders.contains_key(&order.id) {
            return Err(DomainError::new(
                ErrorCode::OrderExists,
                format!("Order {} already exists", order.id),
            ));
        }
        orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, DomainError> {
        Ok(self.orders.read().await.get(id).cloned())
    }

    async fn transition_if_created(
        &self,
        id: &OrderId,
        target: OrderStatus,
        transaction: Transaction,
    ) -> Result<TransitionResult, DomainError> {
        let mut orders = self.orders.write().await;
        let Some(order) = orders.get_mut(id) else {
            return Ok(TransitionResult::NotFound);
        };

        match order.apply_callback_outcome(target, transaction)? {
            TransitionOutcome::Transitioned => {
                if order.status == OrderStatus::Paid {
                    self.backlog
                        .enqueue(PendingFulfillment::awaiting_settlement(order.id))
                        .await;
                }
                Ok(TransitionResult::Transitioned(order.clone()))
            }
            TransitionOutcome::AlreadyTerminal { .. } => {
                Ok(TransitionResult::AlreadyTerminal(order.clone()))
            }
        }
    }
}
