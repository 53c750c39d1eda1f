use std::marker::PhantomData;
use std::sync::Arc;

use log::{debug, info};

use super::cache_model::{CacheConfig, CacheValue};
use super::cache_traits::{CacheManagerTrait, CacheRegionTrait};
use crate::errors::{Result, StoreError};

/// A region paired with the value type it holds.
///
/// Owns JSON encoding of `V`; any encode/decode fault surfaces as
/// `StoreError::Serialization`.
pub struct TypedCache<V> {
    region: Arc<dyn CacheRegionTrait>,
    _value: PhantomData<fn() -> V>,
}

impl<V> Clone for TypedCache<V> {
    fn clone(&self) -> Self {
        Self {
            region: self.region.clone(),
            _value: PhantomData,
        }
    }
}

impl<V: CacheValue> TypedCache<V> {
    pub fn new(region: Arc<dyn CacheRegionTrait>) -> Self {
        Self {
            region,
            _value: PhantomData,
        }
    }

    /// Opens the named region, creating it if the provider doesn't have one.
    pub async fn acquire(manager: &dyn CacheManagerTrait, name: &str) -> Result<Self> {
        if let Some(region) = manager.get_cache(name, V::TYPE_NAME).await? {
            debug!("Found existing cache region '{}'", name);
            return Ok(Self::new(region));
        }

        info!("No cache found named {}", name);
        let region = manager
            .create_cache(name, CacheConfig::for_value::<V>())
            .await?;
        Ok(Self::new(region))
    }

    pub fn name(&self) -> &str {
        self.region.name()
    }

    pub async fn get(&self, key: &str) -> Result<Option<V>> {
        match self.region.get(key).await? {
            Some(payload) => Ok(Some(decode(key, &payload)?)),
            None => Ok(None),
        }
    }

    pub async fn put(&self, key: &str, value: &V) -> Result<()> {
        let payload = serde_json::to_string(value)
            .map_err(|e| StoreError::Serialization(format!("{}: {}", key, e)))?;
        self.region.put(key, payload).await
    }

    /// Decodes every entry of the region.
    pub async fn values(&self) -> Result<Vec<V>> {
        self.region
            .entries()
            .await?
            .iter()
            .map(|(key, payload)| decode(key, payload))
            .collect()
    }
}

fn decode<V: CacheValue>(key: &str, payload: &str) -> Result<V> {
    serde_json::from_str(payload)
        .map_err(|e| StoreError::Serialization(format!("{}: {}", key, e)).into())
}
