//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `fondy` - Hosted checkout and callback verification
//! - `postgres` - Orders, offers, entitlements and the fulfillment backlog
//! - `memory` - In-process implementations of the same ports
//! - `email` - Purchase confirmations through Resend
//! - `fulfillment` - Background retry of deferred fulfillment
//! - `http` - Axum routes and handlers

pub mod email;
pub mod fondy;
pub mod fulfillment;
pub mod http;
pub mod memory;
pub mod postgres;

pub use email::{ResendConfig, ResendNotificationSender};
pub use fondy::{FondyClient, FondyConfig};
pub use fulfillment::{FulfillmentWorker, FulfillmentWorkerConfig};
pub use http::{api_router, PaymentAppState};
