//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors, state machine)
//! - `order` - Order aggregate and its status lifecycle
//! - `payment` - Provider signature scheme, callbacks and checkout

pub mod foundation;
pub mod order;
pub mod payment;
