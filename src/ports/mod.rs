//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Persistence Ports
//!
//! - `OrderRepository` - Orders and their atomic settlement
//! - `OfferCatalog` - Offer prices, entitlements and promo codes
//! - `AccessGrantor` - Student content entitlements
//! - `FulfillmentBacklog` - Paid orders awaiting follow-ups
//!
//! ## External Service Ports
//!
//! - `PaymentProvider` - Hosted checkout and callback authentication
//! - `NotificationSender` - Student e-mail

mod access_grantor;
mod fulfillment_backlog;
mod notification_sender;
mod offer_catalog;
mod order_repository;
mod payment_provider;

pub use access_grantor::AccessGrantor;
pub use fulfillment_backlog::{
    FulfillmentBacklog, PendingFulfillment, RetryPolicy, SETTLEMENT_GRACE_SECS,
};
pub use notification_sender::{EmailMessage, NotificationSender};
pub use offer_catalog::{OfferCatalog, OfferEntitlements, PromoCode};
pub use order_repository::{OrderRepository, TransitionResult};
pub use payment_provider::PaymentProvider;
