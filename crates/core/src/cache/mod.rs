//! Cache module - the provider contract the query store is built on.

mod cache_model;
mod cache_traits;
mod typed_cache;

// Re-export the public interface
pub use cache_model::{CacheConfig, CacheValue};
pub use cache_traits::{CacheManagerTrait, CacheRegionTrait};
pub use typed_cache::TypedCache;
