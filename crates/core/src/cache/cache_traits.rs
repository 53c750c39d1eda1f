//! Cache provider traits.
//!
//! These traits define the contract a cache provider must honour without any
//! provider-specific types, allowing the provider to be swapped without
//! touching the query store.

use std::sync::Arc;

use async_trait::async_trait;

use super::cache_model::CacheConfig;
use crate::errors::Result;

/// Entry point of a cache provider: hands out named regions.
#[async_trait]
pub trait CacheManagerTrait: Send + Sync {
    /// Looks up an existing region.
    ///
    /// Returns `Ok(None)` if no region with this name exists. Returns an
    /// `Initialization` error if the region exists but was created for a
    /// different value type, or if the provider is unreachable.
    async fn get_cache(
        &self,
        name: &str,
        value_type: &str,
    ) -> Result<Option<Arc<dyn CacheRegionTrait>>>;

    /// Creates a region.
    ///
    /// Creating a region that already exists with the same value type returns
    /// the existing region, so racing creators end up sharing one region.
    async fn create_cache(
        &self,
        name: &str,
        config: CacheConfig,
    ) -> Result<Arc<dyn CacheRegionTrait>>;
}

/// A single named key-value region.
///
/// Payloads are opaque JSON text; encoding is the caller's concern (see
/// [`super::TypedCache`]). Atomicity of individual `get`/`put` calls is the
/// provider's responsibility.
#[async_trait]
pub trait CacheRegionTrait: Send + Sync {
    fn name(&self) -> &str;

    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Inserts or replaces the payload stored under `key`.
    async fn put(&self, key: &str, payload: String) -> Result<()>;

    /// Snapshot of every entry. Order is provider-defined and not stable.
    async fn entries(&self) -> Result<Vec<(String, String)>>;
}
