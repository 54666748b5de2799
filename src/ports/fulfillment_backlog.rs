//! Fulfillment backlog port.
//!
//! Paid orders whose access grant or confirmation is still outstanding. An
//! entry is written in the same commit that marks an order paid, so a
//! settlement interrupted between the status write and its follow-ups is
//! never lost; settlement resolves the entry once the follow-ups succeed.
//!
//! Failed entries are retried with exponential backoff and parked after
//! [`RetryPolicy::max_attempts`]. Parked entries stay in the store for
//! operators but are no longer handed out by [`FulfillmentBacklog::pending`].

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, OrderId, Timestamp};

/// How long an entry enqueued by settlement is held back, giving the
/// in-flight settlement time to finish its own follow-ups.
pub const SETTLEMENT_GRACE_SECS: i64 = 300;

/// An order awaiting fulfillment follow-ups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFulfillment {
    pub order_id: OrderId,
    /// Access was granted and only the confirmation is outstanding.
    pub access_granted: bool,
    /// Last failure, for operators.
    pub reason: String,
    pub attempts: u32,
    pub recorded_at: Timestamp,
    /// Earliest moment the entry may be retried.
    pub next_attempt_at: Timestamp,
    /// Set once retries are exhausted.
    pub parked_at: Option<Timestamp>,
}

impl PendingFulfillment {
    /// Entry that is due immediately.
    pub fn new(order_id: OrderId, access_granted: bool, reason: impl Into<String>) -> Self {
        let now = Timestamp::now();
        Self {
            order_id,
            access_granted,
            reason: reason.into(),
            attempts: 0,
            recorded_at: now,
            next_attempt_at: now,
            parked_at: None,
        }
    }

    /// Entry written together with a `Paid` transition.
    pub fn awaiting_settlement(order_id: OrderId) -> Self {
        let mut entry = Self::new(order_id, false, "awaiting settlement follow-ups");
        entry.next_attempt_at = entry.recorded_at.plus_secs(SETTLEMENT_GRACE_SECS);
        entry
    }

    pub fn is_parked(&self) -> bool {
        self.parked_at.is_some()
    }
}

/// Exponential backoff for failed fulfillment attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub base_delay_secs: i64,
    pub max_delay_secs: i64,
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base_delay_secs: 30,
            max_delay_secs: 3600,
            max_attempts: 10,
        }
    }
}

impl RetryPolicy {
    /// When to retry after `attempts` failures, or `None` once the entry
    /// should be parked.
    pub fn next_attempt_at(&self, attempts: u32, now: Timestamp) -> Option<Timestamp> {
        if attempts >= self.max_attempts {
            return None;
        }
        let exponent = attempts.saturating_sub(1).min(30);
        let delay = self
            .base_delay_secs
            .saturating_mul(1_i64 << exponent)
            .min(self.max_delay_secs);
        Some(now.plus_secs(delay))
    }
}

/// Port for the deferred fulfillment queue.
#[async_trait]
pub trait FulfillmentBacklog: Send + Sync {
    /// Add or replace the entry for an order.
    async fn record(&self, entry: PendingFulfillment) -> Result<(), DomainError>;

    /// Unparked entries due by `due_by`, earliest `next_attempt_at` first,
    /// at most `limit`.
    async fn pending(
        &self,
        limit: usize,
        due_by: Timestamp,
    ) -> Result<Vec<PendingFulfillment>, DomainError>;

    /// Remove the entry once fulfillment completed. Unknown ids are ignored.
    async fn resolve(&self, order_id: &OrderId) -> Result<(), DomainError>;

    /// Count a failed attempt and remember why. `retry_at` of `None` parks
    /// the entry.
    async fn mark_attempt_failed(
        &self,
        order_id: &OrderId,
        access_granted: bool,
        reason: &str,
        retry_at: Option<Timestamp>,
    ) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_entry_is_due_immediately() {
        let entry = PendingFulfillment::new(OrderId::new(), false, "grant failed");
        assert_eq!(entry.attempts, 0);
        assert!(!entry.access_granted);
        assert_eq!(entry.next_attempt_at, entry.recorded_at);
        assert!(!entry.is_parked());
    }

    #[test]
    fn settlement_entry_is_held_back() {
        let entry = PendingFulfillment::awaiting_settlement(OrderId::new());
        assert_eq!(
            entry
                .next_attempt_at
                .duration_since(&entry.recorded_at)
                .num_seconds(),
            SETTLEMENT_GRACE_SECS
        );
        assert!(!entry.access_granted);
    }

    #[test]
    fn backoff_doubles_until_capped() {
        let policy = RetryPolicy {
            base_delay_secs: 30,
            max_delay_secs: 100,
            max_attempts: 10,
        };
        let now = Timestamp::now();
        let delay = |attempts| {
            policy
                .next_attempt_at(attempts, now)
                .unwrap()
                .duration_since(&now)
                .num_seconds()
        };

        assert_eq!(delay(1), 30);
        assert_eq!(delay(2), 60);
        assert_eq!(delay(3), 100);
        assert_eq!(delay(9), 100);
    }

    #[test]
    fn exhausted_attempts_park() {
        let policy = RetryPolicy {
            max_attempts: 3,
            ..RetryPolicy::default()
        };
        let now = Timestamp::now();
        assert!(policy.next_attempt_at(2, now).is_some());
        assert_eq!(policy.next_attempt_at(3, now), None);
        assert_eq!(policy.next_attempt_at(40, now), None);
    }

    #[test]
    fn fulfillment_backlog_is_object_safe() {
        fn _accepts_dyn(_backlog: &dyn FulfillmentBacklog) {}
    }
}
