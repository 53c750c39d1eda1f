use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, warn};
use tokio::sync::OnceCell;

use super::brokers_model::Broker;
use super::brokers_traits::BrokerViewStoreTrait;
use crate::cache::{CacheManagerTrait, TypedCache};
use crate::constants::BROKER_CACHE_NAME;
use crate::errors::{Error, Result, ValidationError};

/// Cache-backed Broker store.
///
/// The region handle is acquired lazily on first use and then reused. The
/// store does no locking of its own; concurrent puts to one owner are ordered
/// by the provider.
pub struct BrokerViewStore {
    manager: Arc<dyn CacheManagerTrait>,
    cache_name: String,
    cache: OnceCell<TypedCache<Broker>>,
}

impl BrokerViewStore {
    /// Creates a store over the default `broker` region.
    pub fn new(manager: Arc<dyn CacheManagerTrait>) -> Self {
        Self::with_cache_name(manager, BROKER_CACHE_NAME)
    }

    pub fn with_cache_name(
        manager: Arc<dyn CacheManagerTrait>,
        cache_name: impl Into<String>,
    ) -> Self {
        Self {
            manager,
            cache_name: cache_name.into(),
            cache: OnceCell::new(),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.cache.initialized()
    }

    async fn cache(&self) -> Result<&TypedCache<Broker>> {
        self.cache
            .get_or_try_init(|| async {
                debug!("Entering initialize for cache '{}'", self.cache_name);
                let cache = TypedCache::acquire(self.manager.as_ref(), &self.cache_name)
                    .await
                    .map_err(|e| match e {
                        Error::Initialization(_) => e,
                        other => Error::Initialization(other.to_string()),
                    })?;
                debug!("Exiting initialize for cache '{}'", self.cache_name);
                Ok::<_, Error>(cache)
            })
            .await
    }
}

/// Logs a failure and hands it back unchanged.
fn log_failure(operation: &str, err: Error) -> Error {
    warn!("{} failed with {}: {}", operation, err.kind(), err);
    debug!("{} failure detail: {:?}", operation, err);
    err
}

#[async_trait]
impl BrokerViewStoreTrait for BrokerViewStore {
    async fn initialize(&self) -> Result<()> {
        self.cache()
            .await
            .map(|_| ())
            .map_err(|e| log_failure("initialize", e))
    }

    async fn list_all(&self) -> Result<Vec<Broker>> {
        debug!("Entering list_all");
        let cache = self.cache().await.map_err(|e| log_failure("list_all", e))?;
        let brokers = cache
            .values()
            .await
            .map_err(|e| log_failure("list_all", e))?;
        debug!("Returning {} brokers", brokers.len());
        Ok(brokers)
    }

    async fn get(&self, owner: &str) -> Result<Broker> {
        debug!("Getting {} from cache", owner);
        let cache = self.cache().await.map_err(|e| log_failure("get", e))?;
        let broker = cache
            .get(owner)
            .await
            .and_then(|found| found.ok_or_else(|| Error::NotFound(owner.to_string())))
            .map_err(|e| log_failure("get", e))?;
        debug!("Cache retrieval successful for {}", owner);
        Ok(broker)
    }

    async fn put(&self, owner: &str, mut broker: Broker) -> Result<Broker> {
        if owner.is_empty() {
            return Err(log_failure(
                "put",
                ValidationError::MissingField("owner".to_string()).into(),
            ));
        }
        if broker.owner.is_empty() {
            broker.owner = owner.to_string();
        } else if broker.owner != owner {
            return Err(log_failure(
                "put",
                ValidationError::OwnerMismatch {
                    key: owner.to_string(),
                    record: broker.owner,
                }
                .into(),
            ));
        }

        debug!("Putting {} in cache", owner);
        let cache = self.cache().await.map_err(|e| log_failure("put", e))?;
        cache
            .put(owner, &broker)
            .await
            .map_err(|e| log_failure("put", e))?;
        debug!("Cache update successful for {}", owner);
        Ok(broker)
    }
}
