//! In-memory fulfillment backlog.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, OrderId, Timestamp};
use crate::ports::{FulfillmentBacklog, PendingFulfillment};

#[derive(Default)]
pub struct InMemoryFulfillmentBacklog {
    entries: RwLock<HashMap<OrderId, PendingFulfillment>>,
}

impl InMemoryFulfillmentBacklog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, order_id: &OrderId) -> Option<PendingFulfillment> {
        self.entries.read().await.get(order_id).cloned()
    }

    /// Insert unless the order already has an entry.
    pub(super) async fn enqueue(&self, entry: PendingFulfillment) {
        self.entries
            .write()
            .await
            .entry(entry.order_id)
            .or_insert(entry);
    }
}

#[async_trait]
impl FulfillmentBacklog for InMemoryFulfillmentBacklog {
    async fn record(&self, entry: PendingFulfillment) -> Result<(), DomainError> {
        self.entries.write().await.insert(entry.order_id, entry);
        Ok(())
    }

    async fn pending(
        &self,
        limit: usize,
        due_by: Timestamp,
    ) -> Result<Vec<PendingFulfillment>, DomainError> {
        let mut entries: Vec<_> = self
            .entries
            .read()
            .await
            .values()
            .filter(|e| !e.is_parked() && e.next_attempt_at <= due_by)
            .cloned()
            .collect();
        entries.sort_by_key(|e| (e.next_attempt_at, e.recorded_at));
        entries.truncate(limit);
        Ok(entries)
    }

    async fn resolve(&self, order_id: &OrderId) -> Result<(), DomainError> {
        self.entries.write().await.remove(order_id);
        Ok(())
    }

    async fn mark_attempt_failed(
        &self,
        order_id: &OrderId,
        access_granted: bool,
        reason: &str,
        retry_at: Option<Timestamp>,
    ) -> Result<(), DomainError> {
        if let Some(entry) = self.entries.write().await.get_mut(order_id) {
            entry.attempts += 1;
            entry.access_granted = access_granted;
            entry.reason = reason.to_string();
            match retry_at {
                Some(at) => entry.next_attempt_at = at,
                None => entry.parked_at = Some(Timestamp::now()),
            }
        }
        Ok(())
    }
}
