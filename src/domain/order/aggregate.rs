//! Order aggregate entity.
//!
//! An Order is one purchase attempt: who is buying, what they are buying,
//! at what price, and how the payment provider answered.
//!
//! # Design Decisions
//!
//! - **Snapshots**: student, offer and promo are copied in at creation and
//!   never change, so later edits to the catalog do not rewrite history
//! - **Money in minor units**: `amount` is an unsigned integer (kopecks, cents)
//! - **Single exit from Created**: see [`OrderStatus`]
//! - **Append-only audit**: `transactions` only ever grows

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    OfferId, OrderId, PromoId, SchoolId, StateMachine, StudentId, Timestamp, ValidationError,
};

use super::{Currency, OrderStatus, Transaction};

/// Student details captured when the order was placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentSnapshot {
    pub id: StudentId,
    pub name: String,
    pub email: String,
}

/// Offer details captured when the order was placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferSnapshot {
    pub id: OfferId,
    pub name: String,
}

/// Promo code applied to the order, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromoSnapshot {
    pub id: PromoId,
    pub code: String,
}

/// Result of applying a callback outcome to an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The order left `Created` for the requested status.
    Transitioned,
    /// The order was already terminal; only the audit record was added.
    AlreadyTerminal { current: OrderStatus },
}

/// Order aggregate.
///
/// # Invariants
///
/// - `status` starts as `Created`
/// - `status` changes at most once, and only out of `Created`
/// - `transactions` is never shortened or rewritten
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub school_id: SchoolId,
    pub student: StudentSnapshot,
    pub offer: OfferSnapshot,
    pub promo: Option<PromoSnapshot>,
    pub amount: u64,
    pub currency: Currency,
    pub status: OrderStatus,
    pub transactions: Vec<Transaction>,
    pub created_at: Timestamp,
}

impl Order {
    /// Create a new order awaiting payment.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the amount is zero or the student e-mail
    /// is empty.
    pub fn create(
        id: OrderId,
        school_id: SchoolId,
        student: StudentSnapshot,
        offer: OfferSnapshot,
        promo: Option<PromoSnapshot>,
        amount: u64,
        currency: Currency,
    ) -> Result<Self, ValidationError> {
        if amount == 0 {
            return Err(ValidationError::out_of_range("amount", 1, i64::MAX, 0));
        }
        if student.email.trim().is_empty() {
            return Err(ValidationError::empty_field("student.email"));
        }

        Ok(Self {
            id,
            school_id,
            student,
            offer,
            promo,
            amount,
            currency,
            status: OrderStatus::Created,
            transactions: Vec::new(),
            created_at: Timestamp::now(),
        })
    }

    /// Whether the order still awaits the provider's verdict.
    pub fn is_awaiting_payment(&self) -> bool {
        self.status == OrderStatus::Created
    }

    /// Apply the outcome of one provider callback.
    ///
    /// The transaction is always appended. The status changes only while the
    /// order is `Created`; a terminal order absorbs the callback unchanged.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if `target` is `Created`, which no callback
    /// may resolve to.
    pub fn apply_callback_outcome(
        &mut self,
        target: OrderStatus,
        transaction: Transaction,
    ) -> Result<TransitionOutcome, ValidationError> {
        if target == OrderStatus::Created {
            return Err(ValidationError::invalid_format(
                "status",
                "a callback cannot move an order back to created",
            ));
        }

        if self.status.is_terminal() {
            self.transactions.push(transaction);
            return Ok(TransitionOutcome::AlreadyTerminal {
                current: self.status,
            });
        }

        self.status = self.status.transition_to(target)?;
        self.transactions.push(transaction);
        Ok(TransitionOutcome::Transitioned)
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn new_order_starts_created_with_empty_history() {
        let order = created_order();
        assert_eq!(order.status, OrderStatus::Created);
        assert!(order.transactions.is_empty());
        assert!(order.is_awaiting_payment());
    }

    #[test]
    fn create_rejects_zero_amount() {
        let result = Order::create(
            OrderId::new(),
            SchoolId::new(),
            student(),
            offer(),
            None,
            0,
            Currency::new("USD").unwrap(),
        );
        assert!(matches!(result, Err(ValidationError::OutOfRange { .. })));
    }

    #[test]
    fn create_rejects_blank_student_email() {
        let mut s = student();
        s.email = "  ".to_string();
        let result = Order::create(
            OrderId::new(),
            SchoolId::new(),
            s,
            offer(),
            None,
            100,
            Currency::new("USD").unwrap(),
        );
        assert!(matches!(result, Err(ValidationError::EmptyField { .. })));
    }

    #[test]
    fn approved_outcome_moves_created_to_paid() {
        let mut order = created_order();
        let outcome = order
            .apply_callback_outcome(OrderStatus::Paid, Transaction::new(OrderStatus::Paid, "{}"))
            .unwrap();

        assert_eq!(outcome, TransitionOutcome::Transitioned);
        assert_eq!(order.status, OrderStatus::Paid);
        assert_eq!(order.transactions.len(), 1);
    }

    #[test]
    fn terminal_order_only_gains_a_transaction() {
        let mut order = created_order();
        order
            .apply_callback_outcome(OrderStatus::Paid, Transaction::new(OrderStatus::Paid, "1"))
            .unwrap();

        let outcome = order
            .apply_callback_outcome(
                OrderStatus::Failed,
                Transaction::new(OrderStatus::Failed, "2"),
            )
            .unwrap();

        assert_eq!(
            outcome,
            TransitionOutcome::AlreadyTerminal {
                current: OrderStatus::Paid
            }
        );
        assert_eq!(order.status, OrderStatus::Paid);
        assert_eq!(order.transactions.len(), 2);
        assert_eq!(order.transactions[1].status, OrderStatus::Failed);
    }

    #[test]
    fn failed_order_is_not_reopened_by_approval() {
        let mut order = created_order();
        order
            .apply_callback_outcome(OrderStatus::Failed, Transaction::new(OrderStatus::Failed, ""))
            .unwrap();
        order
            .apply_callback_outcome(OrderStatus::Paid, Transaction::new(OrderStatus::Paid, ""))
            .unwrap();

        assert_eq!(order.status, OrderStatus::Failed);
    }

    #[test]
    fn created_is_not_a_valid_callback_outcome() {
        let mut order = created_order();
        let result = order.apply_callback_outcome(
            OrderStatus::Created,
            Transaction::new(OrderStatus::Created, ""),
        );
        assert!(result.is_err());
        assert!(order.transactions.is_empty());
    }
}
