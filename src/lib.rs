//! Courses Backend - Course Checkout and Payment Settlement
//!
//! This crate sells course offers through a hosted payment page and settles
//! orders from the provider's signed callbacks, granting content access
//! exactly once per paid order.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
