//! Dedicated-table backend: one `<entity>_records` table per entity.

use std::collections::BTreeMap;

use async_trait::async_trait;

use datastore_core::{DataObject, DataStore, Result};

use crate::config::DatabaseConfig;
use crate::migration;
use crate::sqlite::{SqliteDatabase, TableLayout, TableStore};

/// Stores one entity type in its own relational tables.
///
/// Opening the store creates `<entity>_records` and `<entity>_meta` if
/// missing. Hyphens in the entity name become underscores in table names.
#[derive(Debug, Clone)]
pub struct CustomTableStore {
    table: TableStore,
}

impl CustomTableStore {
    /// Bind an entity's tables in an open database, creating them if needed.
    ///
    /// Fails with `InvalidData` if the entity name cannot name a table.
    pub fn new(db: SqliteDatabase, entity: &str) -> Result<Self> {
        let prefix = migration::table_prefix(entity)?;
        db.with_conn(|conn| migration::ensure_custom_table(conn, &prefix))?;

        Ok(Self {
            table: TableStore::new(db, TableLayout::dedicated(&prefix)),
        })
    }

    /// Open the configured database and bind an entity's tables.
    pub fn open(config: &DatabaseConfig, entity: &str) -> Result<Self> {
        Self::new(SqliteDatabase::open(config)?, entity)
    }

    /// Name of the record table.
    pub fn table_name(&self) -> &str {
        self.table.layout().records()
    }
}

#[async_trait]
impl DataStore for CustomTableStore {
    async fn create(&self, object: &mut DataObject) -> Result<()> {
        self.table.create(object).await
    }

    async fn read(&self, id: u64) -> Result<Option<DataObject>> {
        self.table.read(id).await
    }

    async fn update(&self, object: &DataObject) -> Result<()> {
        self.table.update(object).await
    }

    async fn delete(&self, id: u64) -> Result<bool> {
        self.table.delete(id).await
    }

    async fn read_meta(&self, id: u64) -> Result<BTreeMap<String, String>> {
        self.table.read_meta(id).await
    }

    async fn update_meta(&self, id: u64, key: &str, value: &str) -> Result<()> {
        self.table.update_meta(id, key, value).await
    }

    async fn delete_meta(&self, id: u64, key: &str) -> Result<bool> {
        self.table.delete_meta(id, key).await
    }
}
