//! Content-object backend: every entity type shares the `objects` table.

use std::collections::BTreeMap;

use async_trait::async_trait;

use datastore_core::{DataObject, DataStore, Result};

use crate::config::DatabaseConfig;
use crate::sqlite::{SqliteDatabase, TableLayout, TableStore};

/// Stores objects as rows of the generic `objects` table, partitioned by scope.
///
/// The scope is the registry name the store was resolved under, so a
/// `"product"` store never sees rows written by an `"order"` store even when
/// both share a database. The object's own `object_type` is kept per row and
/// may be a subtype of the scope.
#[derive(Debug, Clone)]
pub struct ObjectTableStore {
    table: TableStore,
}

impl ObjectTableStore {
    /// Bind a scope to an open database.
    pub fn new(db: SqliteDatabase, scope: impl Into<String>) -> Self {
        Self {
            table: TableStore::new(db, TableLayout::shared(scope)),
        }
    }

    /// Open the configured database and bind a scope to it.
    pub fn open(config: &DatabaseConfig, scope: impl Into<String>) -> Result<Self> {
        Ok(Self::new(SqliteDatabase::open(config)?, scope))
    }

    /// The partition this store reads and writes.
    pub fn scope(&self) -> &str {
        self.table.layout().scope().unwrap_or_default()
    }
}

#[async_trait]
impl DataStore for ObjectTableStore {
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
