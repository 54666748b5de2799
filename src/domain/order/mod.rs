//! Order domain module.
//!
//! A purchase attempt and its payment lifecycle.
//!
//! # Module Structure
//!
//! - `aggregate` - Order aggregate and its snapshots
//! - `status` - OrderStatus state machine
//! - `transaction` - Audit trail entries
//! - `pricing` - Currency codes and discount arithmetic

mod aggregate;
mod pricing;
mod status;
mod transaction;

pub use aggregate::{OfferSnapshot, Order, PromoSnapshot, StudentSnapshot, TransitionOutcome};
pub use pricing::{discounted_amount, Currency};
pub use status::OrderStatus;
pub use transaction::Transaction;

#[cfg(test)]
pub(crate) use aggregate::fixtures;
