//! DataStore trait: the capability contract for object persistence.
//!
//! The locator never inspects a store beyond this trait. Implementations
//! include an in-memory map, a shared content-object table, and dedicated
//! per-entity tables.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::{Result, StoreError};
use crate::object::DataObject;

/// The DataStore trait: async interface for entity persistence.
///
/// # Design Notes
///
/// - **Ids are store-assigned**: `create` fills in `DataObject::id`, starting at 1.
/// - **Meta is upserted**: writing an existing key replaces its value.
/// - **Absent rows**: `read` returns `None`; `update` and meta writes return `NotFound`.
#[async_trait]
pub trait DataStore: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Object Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Persist a new object and assign its id.
    ///
    /// Fails with `InvalidData` if the object already carries an id.
    async fn create(&self, object: &mut DataObject) -> Result<()>;

    /// Read an object by id.
    async fn read(&self, id: u64) -> Result<Option<DataObject>>;

    /// Overwrite the stored properties of an existing object.
    async fn update(&self, object: &DataObject) -> Result<()>;

    /// Delete an object and its meta. Returns `true` if a row was removed.
    async fn delete(&self, id: u64) -> Result<bool>;

    // ─────────────────────────────────────────────────────────────────────────
    // Meta Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Read all meta entries for an object, ordered by key.
    async fn read_meta(&self, id: u64) -> Result<BTreeMap<String, String>>;

    /// Insert or replace one meta entry.
    async fn update_meta(&self, id: u64, key: &str, value: &str) -> Result<()>;

    /// Remove one meta entry. Returns `true` if it existed.
    async fn delete_meta(&self, id: u64, key: &str) -> Result<bool>;
}

/// Extension trait for common store patterns.
pub trait DataStoreExt: DataStore {
    /// Create the object if it has no id yet, otherwise update it.
    fn save(
        &self,
        object: &mut DataObject,
    ) -> impl std::future::Future<Output = Result<u64>> + Send;
}

impl<S: DataStore + ?Sized> DataStoreExt for S {
    async fn save(&self, object: &mut DataObject) -> Result<u64> {
        match object.id {
            Some(id) => {
                self.update(object).await?;
                Ok(id)
            }
            None => {
                self.create(object).await?;
                object
                    .id
                    .ok_or_else(|| StoreError::InvalidData("store did not assign an id".into()))
            }
        }
    }
}
