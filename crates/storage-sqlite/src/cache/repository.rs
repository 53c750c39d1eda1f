use std::sync::Arc;

use async_trait::async_trait;
use broker_query_core::cache::{CacheConfig, CacheManagerTrait, CacheRegionTrait};
use broker_query_core::{Error, Result};
use chrono::Utc;
use diesel::prelude::*;
use diesel::SqliteConnection;
use log::{debug, info};

use super::model::{CacheEntryDB, CacheRegionDB};
use crate::db::{self, get_connection, DbPool, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::{cache_entries, cache_regions};

/// A region persisted in the `cache_entries` table.
///
/// Reads go through the pool; writes are serialized through the writer actor.
pub struct SqliteCache {
    name: String,
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl SqliteCache {
    fn new(name: String, pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        SqliteCache { name, pool, writer }
    }
}

#[async_trait]
impl CacheRegionTrait for SqliteCache {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = get_connection(&self.pool)?;
        let payload = cache_entries::table
            .filter(cache_entries::region.eq(&self.name))
            .filter(cache_entries::cache_key.eq(key))
            .select(cache_entries::payload)
            .first::<String>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(payload)
    }

    async fn put(&self, key: &str, payload: String) -> Result<()> {
        let entry = CacheEntryDB {
            region: self.name.clone(),
            cache_key: key.to_string(),
            payload,
            updated_at: Utc::now().naive_utc(),
        };
        self.writer
            .exec(move |conn: &mut SqliteConnection| {
                diesel::replace_into(cache_entries::table)
                    .values(&entry)
                    .execute(conn)?;
                Ok(())
            })
            .await
            .into_core()
    }

    async fn entries(&self) -> Result<Vec<(String, String)>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = cache_entries::table
            .filter(cache_entries::region.eq(&self.name))
            .select((cache_entries::cache_key, cache_entries::payload))
            .load::<(String, String)>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows)
    }
}

/// Cache manager over a single SQLite database file.
///
/// Regions and entries survive restarts. Cloning shares the pool and writer.
#[derive(Clone)]
pub struct SqliteCacheManager {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl SqliteCacheManager {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        SqliteCacheManager { pool, writer }
    }

    /// Opens (creating if needed) the database at `db_path`, applies pending
    /// migrations and starts the writer.
    ///
    /// Must be called from within a Tokio runtime. Every failure is reported
    /// as an `Initialization` error.
    pub fn open(db_path: &str) -> Result<Self> {
        let opened = db::init(db_path).and_then(|path| {
            let pool = db::create_pool(&path)?;
            db::run_migrations(&pool)?;
            let writer = db::spawn_writer(&pool)?;
            Ok(Self::new(pool, writer))
        });
        match opened {
            Ok(manager) => {
                info!("Opened SQLite cache at {}", db_path);
                Ok(manager)
            }
            Err(e) => Err(Error::Initialization(format!(
                "failed to open cache database {}: {}",
                db_path, e
            ))),
        }
    }

    pub fn region_names(&self) -> Result<Vec<String>> {
        let mut conn = get_connection(&self.pool)?;
        let names = cache_regions::table
            .select(cache_regions::name)
            .order(cache_regions::name.asc())
            .load::<String>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(names)
    }

    fn region(&self, name: String) -> Arc<dyn CacheRegionTrait> {
        Arc::new(SqliteCache::new(name, self.pool.clone(), self.writer.clone()))
    }
}

fn check_value_type(
    region: &CacheRegionDB,
    requested: &str,
) -> std::result::Result<(), StorageError> {
    if region.value_type == requested {
        Ok(())
    } else {
        Err(StorageError::RegionTypeMismatch {
            name: region.name.clone(),
            existing: region.value_type.clone(),
            requested: requested.to_string(),
        })
    }
}

#[async_trait]
impl CacheManagerTrait for SqliteCacheManager {
    async fn get_cache(
        &self,
        name: &str,
        value_type: &str,
    ) -> Result<Option<Arc<dyn CacheRegionTrait>>> {
        let mut conn = get_connection(&self.pool)?;
        let found = cache_regions::table
            .find(name)
            .select(CacheRegionDB::as_select())
            .first::<CacheRegionDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;

        match found {
            Some(region) => {
                check_value_type(&region, value_type)?;
                Ok(Some(self.region(region.name)))
            }
            None => Ok(None),
        }
    }

    async fn create_cache(
        &self,
        name: &str,
        config: CacheConfig,
    ) -> Result<Arc<dyn CacheRegionTrait>> {
        let new_region = CacheRegionDB {
            name: name.to_string(),
            value_type: config.value_type,
            created_at: Utc::now().naive_utc(),
        };
        let region = self
            .writer
            .exec(move |conn: &mut SqliteConnection| {
                let inserted = diesel::insert_or_ignore_into(cache_regions::table)
                    .values(&new_region)
                    .execute(conn)?;
                if inserted > 0 {
                    debug!("Created SQLite cache '{}'", new_region.name);
                }
                let stored = cache_regions::table
                    .find(&new_region.name)
                    .select(CacheRegionDB::as_select())
                    .first::<CacheRegionDB>(conn)?;
                check_value_type(&stored, &new_region.value_type)?;
                Ok(stored)
            })
            .await
            .into_core()?;

        Ok(self.region(region.name))
    }
}
