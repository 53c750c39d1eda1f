//! In-process (single node) cache provider.
//!
//! Regions live in the process and vanish with it. Each region is a sharded
//! `DashMap`, so individual gets and puts are atomic without a global lock.

use std::sync::Arc;

use async_trait::async_trait;
use broker_query_core::cache::{CacheConfig, CacheManagerTrait, CacheRegionTrait};
use broker_query_core::{Error, Result};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use log::debug;

/// A single in-memory region.
#[derive(Debug)]
pub struct MemoryCache {
    name: String,
    value_type: String,
    entries: DashMap<String, String>,
}

impl MemoryCache {
    fn new(name: &str, value_type: &str) -> Self {
        Self {
            name: name.to_string(),
            value_type: value_type.to_string(),
            entries: DashMap::new(),
        }
    }
}

#[async_trait]
impl CacheRegionTrait for MemoryCache {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    async fn put(&self, key: &str, payload: String) -> Result<()> {
        self.entries.insert(key.to_string(), payload);
        Ok(())
    }

    async fn entries(&self) -> Result<Vec<(String, String)>> {
        Ok(self
            .entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect())
    }
}

/// In-memory cache manager.
///
/// Cloning shares the underlying regions.
#[derive(Debug, Clone, Default)]
pub struct MemoryCacheManager {
    regions: Arc<DashMap<String, Arc<MemoryCache>>>,
}

impl MemoryCacheManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn region_names(&self) -> Vec<String> {
        self.regions.iter().map(|r| r.key().clone()).collect()
    }
}

fn type_mismatch(name: &str, existing: &str, requested: &str) -> Error {
    Error::Initialization(format!(
        "cache '{}' holds {} values, not {}",
        name, existing, requested
    ))
}

#[async_trait]
impl CacheManagerTrait for MemoryCacheManager {
    async fn get_cache(
        &self,
        name: &str,
        value_type: &str,
    ) -> Result<Option<Arc<dyn CacheRegionTrait>>> {
        match self.regions.get(name) {
            Some(region) if region.value_type != value_type => {
                Err(type_mismatch(name, &region.value_type, value_type))
            }
            Some(region) => Ok(Some(region.value().clone() as Arc<dyn CacheRegionTrait>)),
            None => Ok(None),
        }
    }

    async fn create_cache(
        &self,
        name: &str,
        config: CacheConfig,
    ) -> Result<Arc<dyn CacheRegionTrait>> {
        let region = match self.regions.entry(name.to_string()) {
            Entry::Occupied(existing) => {
                let region = existing.get();
                if region.value_type != config.value_type {
                    return Err(type_mismatch(name, &region.value_type, &config.value_type));
                }
                region.clone()
            }
            Entry::Vacant(slot) => {
                debug!("Creating in-memory cache '{}'", name);
                slot.insert(Arc::new(MemoryCache::new(name, &config.value_type)))
                    .value()
                    .clone()
            }
        };
        Ok(region as Arc<dyn CacheRegionTrait>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use broker_query_core::brokers::{Broker, BrokerViewStore, BrokerViewStoreTrait};

    fn broker_config() -> CacheConfig {
        CacheConfig {
            value_type: "Broker".to_string(),
        }
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let manager = MemoryCacheManager::new();
        let region = manager.create_cache("broker", broker_config()).await.unwrap();

        region.put("alice", "{}".to_string()).await.unwrap();
        assert_eq!(region.get("alice").await.unwrap(), Some("{}".to_string()));
        assert_eq!(region.get("bob").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_put_replaces() {
        let manager = MemoryCacheManager::new();
        let region = manager.create_cache("broker", broker_config()).await.unwrap();

        region.put("alice", "1".to_string()).await.unwrap();
        region.put("alice", "2".to_string()).await.unwrap();
        assert_eq!(region.get("alice").await.unwrap(), Some("2".to_string()));
        assert_eq!(region.entries().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_cache_before_create() {
        let manager = MemoryCacheManager::new();
        assert!(manager.get_cache("broker", "Broker").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_is_shared_and_idempotent() {
        let manager = MemoryCacheManager::new();
        let first = manager.create_cache("broker", broker_config()).await.unwrap();
        first.put("alice", "{}".to_string()).await.unwrap();

        let second = manager.create_cache("broker", broker_config()).await.unwrap();
        assert_eq!(second.get("alice").await.unwrap(), Some("{}".to_string()));

        let clone = manager.clone();
        let found = clone.get_cache("broker", "Broker").await.unwrap().unwrap();
        assert_eq!(found.entries().await.unwrap().len(), 1);
        assert_eq!(manager.region_names(), vec!["broker".to_string()]);
    }

    #[tokio::test]
    async fn test_type_mismatch_is_initialization_error() {
        let manager = MemoryCacheManager::new();
        manager.create_cache("broker", broker_config()).await.unwrap();

        let err = manager.get_cache("broker", "Portfolio").await.err().unwrap();
        assert!(matches!(err, Error::Initialization(_)));

        let err = manager
            .create_cache(
                "broker",
                CacheConfig {
                    value_type: "Portfolio".to_string(),
                },
            )
            .await
            .err()
            .unwrap();
        assert!(matches!(err, Error::Initialization(_)));
    }

    #[tokio::test]
    async fn test_store_over_memory_provider() {
        let manager = Arc::new(MemoryCacheManager::new());
        let store = BrokerViewStore::new(manager.clone());

        assert!(store.list_all().await.unwrap().is_empty());
        store.put("alice", Broker::new("alice")).await.unwrap();
        assert_eq!(store.get("alice").await.unwrap().owner, "alice");
        assert!(matches!(store.get("bob").await, Err(Error::NotFound(_))));
        assert_eq!(manager.region_names(), vec!["broker".to_string()]);
    }
}
