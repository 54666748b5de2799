//! Background processing of the fulfillment backlog.

mod worker;

pub use worker::{FulfillmentWorker, FulfillmentWorkerConfig};
