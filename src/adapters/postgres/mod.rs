//! PostgreSQL adapters - Database implementations for the persistence ports.
//!
//! - `PostgresOrderRepository` - orders with compare-and-swap settlement
//! - `PostgresOfferCatalog` - offers and promo codes
//! - `PostgresAccessGrantor` - student course/module entitlements
//! - `PostgresFulfillmentBacklog` - deferred fulfillment queue

mod access_grantor;
mod fulfillment_backlog;
mod offer_catalog;
mod order_repository;

pub use access_grantor::PostgresAccessGrantor;
pub use fulfillment_backlog::PostgresFulfillmentBacklog;
pub use offer_catalog::PostgresOfferCatalog;
pub use order_repository::PostgresOrderRepository;
