//! Audit record appended for every processed payment callback.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

use super::OrderStatus;

/// One entry in an order's append-only audit trail.
///
/// The status is the one the callback resolved to, which for a duplicate
/// delivery may differ from the order's (already terminal) status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub status: OrderStatus,
    pub created_at: Timestamp,
    pub additional_info: String,
}

impl Transaction {
    pub fn new(status: OrderStatus, additional_info: impl Into<String>) -> Self {
        Self {
            status,
            created_at: Timestamp::now(),
            additional_info: additional_info.into(),
        }
    }
}
