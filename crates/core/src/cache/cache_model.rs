//! Cache configuration models.

use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// A type that can be stored in a cache region.
///
/// `TYPE_NAME` is recorded by the provider when a region is created, so a
/// region can't later be opened for a different value type. It must be stable
/// across builds.
pub trait CacheValue: Serialize + DeserializeOwned + Send + Sync + 'static {
    const TYPE_NAME: &'static str;
}

/// Settings used when creating a region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheConfig {
    /// Stable name of the value type held by the region.
    pub value_type: String,
}

impl CacheConfig {
    pub fn for_value<V: CacheValue>() -> Self {
        Self {
            value_type: V::TYPE_NAME.to_string(),
        }
    }
}
