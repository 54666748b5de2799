//! In-memory adapters for every persistence and notification port.
//!
//! Backed by `tokio::sync` locks; state lives as long as the process.

mod access_grantor;
mod fulfillment_backlog;
mod notification_sender;
mod offer_catalog;
mod order_repository;

pub use access_grantor::{InMemoryAccessGrantor, StudentAccess};
pub use fulfillment_backlog::InMemoryFulfillmentBacklog;
pub use notification_sender::InMemoryNotificationSender;
pub use offer_catalog::InMemoryOfferCatalog;
pub use order_repository::InMemoryOrderRepository;
