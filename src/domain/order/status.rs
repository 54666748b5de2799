//! Order status state machine.
//!
//! An order is born `Created` and leaves that state exactly once. Every other
//! state is terminal: later callbacks for the same order only add audit
//! records.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{StateMachine, ValidationError};

/// Lifecycle status of a purchase attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Awaiting the provider's verdict. The only valid initial state.
    Created,

    /// Provider approved the payment. Access has been (or will be) granted.
    Paid,

    /// Provider reported a recognized non-approved outcome.
    Failed,

    /// Provider reported a status this system does not recognize.
    Other,
}

impl OrderStatus {
    /// Storage and wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Created => "created",
            OrderStatus::Paid => "paid",
            OrderStatus::Failed => "failed",
            OrderStatus::Other => "other",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(OrderStatus::Created),
            "paid" => Ok(OrderStatus::Paid),
            "failed" => Ok(OrderStatus::Failed),
            "other" => Ok(OrderStatus::Other),
            _ => Err(ValidationError::invalid_format(
                "status",
                format!("unknown order status '{}'", s),
            )),
        }
    }
}

impl StateMachine for OrderStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use OrderStatus::*;
        matches!((self, target), (Created, Paid) | (Created, Failed) | (Created, Other))
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use OrderStatus::*;
        match self {
            Created => vec![Paid, Failed, Other],
            Paid | Failed | Other => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [OrderStatus; 4] = [
        OrderStatus::Created,
        OrderStatus::Paid,
        OrderStatus::Failed,
        OrderStatus::Other,
    ];

    #[test]
    fn created_can_reach_every_terminal_state() {
        for target in [OrderStatus::Paid, OrderStatus::Failed, OrderStatus::Other] {
            assert_eq!(OrderStatus::Created.transition_to(target), Ok(target));
        }
    }

    #[test]
    fn created_cannot_transition_to_itself() {
        assert!(OrderStatus::Created
            .transition_to(OrderStatus::Created)
            .is_err());
    }

    #[test]
    fn terminal_states_reject_every_transition() {
        for from in [OrderStatus::Paid, OrderStatus::Failed, OrderStatus::Other] {
            assert!(from.is_terminal());
            for target in ALL {
                assert!(
                    from.transition_to(target).is_err(),
                    "{:?} -> {:?} must be rejected",
                    from,
                    target
                );
            }
        }
    }

    #[test]
    fn created_is_not_terminal() {
        assert!(!OrderStatus::Created.is_terminal());
    }

    #[test]
    fn valid_transitions_are_consistent_with_can_transition_to() {
        for status in ALL {
            for target in ALL {
                assert_eq!(
                    status.can_transition_to(&target),
                    status.valid_transitions().contains(&target)
                );
            }
        }
    }

    #[test]
    fn parses_its_own_representation() {
        for status in ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>(), Ok(status));
        }
        assert!("refunded".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&OrderStatus::Paid).unwrap(), "\"paid\"");
    }
}
