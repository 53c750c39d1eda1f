//! SQLite cache provider.

mod model;
mod repository;

pub use model::{CacheEntryDB, CacheRegionDB};
pub use repository::{SqliteCache, SqliteCacheManager};
