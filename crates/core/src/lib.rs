//! Broker Query Core - domain entities, services, and traits.
//!
//! This crate holds the Broker read-model and the query store that serves it.
//! It is provider-agnostic: the cache backing the store is reached through the
//! traits in [`cache`], implemented by the `cache-memory` and `storage-sqlite`
//! crates.

pub mod brokers;
pub mod cache;
pub mod constants;
pub mod errors;
pub mod portfolios;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
