//! Fondy payment provider adapter.
//!
//! Implements the `PaymentProvider` port for Fondy hosted checkout:
//! - Signed checkout requests (`POST /api/checkout/url/`)
//! - Callback signature verification
//!
//! # Security
//!
//! - SHA-1 signatures over the sorted non-empty fields, keyed by the
//!   merchant password
//! - Constant-time signature comparison
//! - The merchant password is held in `secrecy::SecretString`

mod client;

pub use client::{FondyClient, FondyConfig, FONDY_USER_AGENT};
