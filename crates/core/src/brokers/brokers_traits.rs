//! Broker store and refresh traits.

use async_trait::async_trait;

use super::brokers_model::Broker;
use crate::errors::Result;

/// Read and write access to the owner → Broker mapping.
///
/// Provider faults are returned as `Error::Store`, unreachable providers as
/// `Error::Initialization`. Nothing is retried.
#[async_trait]
pub trait BrokerViewStoreTrait: Send + Sync {
    /// Acquires the broker cache region, creating it if absent.
    ///
    /// Idempotent and safe under concurrent first use. Every other operation
    /// calls this first.
    async fn initialize(&self) -> Result<()>;

    /// Every resident record, in provider order. Empty when the store is
    /// empty.
    async fn list_all(&self) -> Result<Vec<Broker>>;

    /// The record for `owner`.
    ///
    /// A missing record is `Error::NotFound(owner)`; no placeholder record is
    /// ever returned in its place.
    async fn get(&self, owner: &str) -> Result<Broker>;

    /// Inserts or wholly replaces the record for `owner`; last write wins.
    ///
    /// A record with an empty owner takes `owner`. A record naming a
    /// different owner is rejected with `ValidationError::OwnerMismatch`.
    async fn put(&self, owner: &str, broker: Broker) -> Result<Broker>;
}

/// Rebuilds cached brokers from the Portfolio service.
#[async_trait]
pub trait BrokerRefreshServiceTrait: Send + Sync {
    /// Fetches `owner`'s portfolio and stores the resulting broker.
    async fn refresh(&self, owner: &str) -> Result<Broker>;

    /// Refreshes every portfolio the service knows. Returns how many brokers
    /// were stored.
    async fn refresh_all(&self) -> Result<usize>;
}
