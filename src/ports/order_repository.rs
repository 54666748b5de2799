//! Order repository port.
//!
//! Defines the contract for persisting orders and settling them.
//!
//! # Design
//!
//! - **Atomic settlement**: `transition_if_created` is the single commit
//!   point for a callback. The status check and the write happen as one
//!   operation, so concurrent deliveries for the same order cannot both
//!   observe `created`.
//! - **Fulfillment enqueue**: a transition to `Paid` writes a
//!   [`PendingFulfillment::awaiting_settlement`] entry in the same commit, so
//!   a paid order always has either completed follow-ups or a backlog entry.
//! - **Append-only audit**: every processed callback appends a transaction,
//!   whether or not it changed the status.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, OrderId};
use crate::domain::order::{Order, OrderStatus, Transaction};

#[cfg(doc)]
use super::PendingFulfillment;

/// Outcome of [`OrderRepository::transition_if_created`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionResult {
    /// The stored order was `Created` and now has the target status.
    Transitioned(Order),
    /// The stored order was already terminal. The transaction was appended
    /// and nothing else changed.
    AlreadyTerminal(Order),
    /// No order with this id exists.
    NotFound,
}

/// Repository port for Order persistence.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Save a new order.
    ///
    /// # Errors
    ///
    /// - `OrderExists` if an order with the same id is stored
    /// - `DatabaseError` on persistence failure
    async fn create(&self, order: &Order) -> Result<(), DomainError>;

    /// Find an order by id. Returns `None` if not found.
    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, DomainError>;

    /// Set the status to `target` only if it is still `Created`, appending
    /// `transaction` in every case where the order exists. Moving to `Paid`
    /// also enqueues the order's fulfillment backlog entry atomically.
    async fn transition_if_created(
        &self,
        id: &OrderId,
        target: OrderStatus,
        transaction: Transaction,
    ) -> Result<TransitionResult, DomainError>;
}
