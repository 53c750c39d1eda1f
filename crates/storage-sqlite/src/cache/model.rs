//! Database models for cache regions and entries.

use chrono::NaiveDateTime;
use diesel::prelude::*;

/// A named region and the value type it was created for.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::cache_regions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CacheRegionDB {
    pub name: String,
    pub value_type: String,
    pub created_at: NaiveDateTime,
}

/// One JSON payload stored under a key within a region.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::cache_entries)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CacheEntryDB {
    pub region: String,
    pub cache_key: String,
    pub payload: String,
    pub updated_at: NaiveDateTime,
}
