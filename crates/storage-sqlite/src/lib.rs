//! SQLite cache provider for the Broker query service.
//!
//! Implements the cache contract from `broker_query_core::cache` on top of a
//! single SQLite file, so the Broker view survives restarts.
//!
//! All Diesel types stay inside this crate; callers only see
//! `broker_query_core` traits and errors.

pub mod cache;
pub mod db;
pub mod errors;
pub mod schema;

pub use cache::{SqliteCache, SqliteCacheManager};
pub use db::{create_pool, get_connection, init, run_migrations, spawn_writer, DbPool, WriteHandle};
pub use errors::{IntoCore, StorageError};
