//! The resolved store handle returned by the locator.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use datastore_core::{DataObject, DataStore, Result as StoreResult};

use crate::error::Result;
use crate::locator::StoreLocator;
use crate::registry::StoreImpl;

/// A live store together with the implementation that produced it.
///
/// Every storage call is forwarded to the wrapped store. What the handle
/// reports about itself is fixed at resolution time; later hook changes
/// only affect handles resolved afterwards.
#[derive(Clone)]
pub struct DataStoreHandle {
    requested_name: String,
    object_type: String,
    class: StoreImpl,
    store: Arc<dyn DataStore>,
}

impl DataStoreHandle {
    /// Resolve `name`, failing with `InvalidStore` if it is not registered.
    pub fn new(locator: &StoreLocator, name: &str) -> Result<Self> {
        locator.get(name)
    }

    /// Resolve `name`, returning `None` if it is not registered.
    pub fn load(locator: &StoreLocator, name: &str) -> Result<Option<Self>> {
        locator.load(name)
    }

    pub(crate) fn from_parts(
        requested_name: &str,
        object_type: &str,
        class: StoreImpl,
        store: Arc<dyn DataStore>,
    ) -> Self {
        Self {
            requested_name: requested_name.to_string(),
            object_type: object_type.to_string(),
            class,
            store,
        }
    }

    /// Canonical name of the implementation backing this handle.
    pub fn current_class_name(&self) -> String {
        self.class.name().to_string()
    }

    /// The implementation backing this handle.
    pub fn implementation(&self) -> &StoreImpl {
        &self.class
    }

    /// The registry name that matched.
    pub fn object_type(&self) -> &str {
        &self.object_type
    }

    /// The name the caller asked for.
    pub fn requested_name(&self) -> &str {
        &self.requested_name
    }

    /// The wrapped store.
    pub fn store(&self) -> &Arc<dyn DataStore> {
        &self.store
    }

    /// A serializable record of what this handle was resolved from.
    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            requested_name: self.requested_name.clone(),
            object_type: self.object_type.clone(),
            class_name: self.current_class_name(),
        }
    }
}

impl fmt::Debug for DataStoreHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataStoreHandle")
            .field("requested_name", &self.requested_name)
            .field("object_type", &self.object_type)
            .field("class", &self.class.name())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl DataStore for DataStoreHandle {
    async fn create(&self, object: &mut DataObject) -> StoreResult<()> {
        self.store.create(object).await
    }

    async fn read(&self, id: u64) -> StoreResult<Option<DataObject>> {
        self.store.read(id).await
    }

    async fn update(&self, object: &DataObject) -> StoreResult<()> {
        self.store.update(object).await
    }

    async fn delete(&self, id: u64) -> StoreResult<bool> {
        self.store.delete(id).await
    }

    async fn read_meta(&self, id: u64) -> StoreResult<BTreeMap<String, String>> {
        self.store.read_meta(id).await
    }

    async fn update_meta(&self, id: u64, key: &str, value: &str) -> StoreResult<()> {
        self.store.update_meta(id, key, value).await
    }

    async fn delete_meta(&self, id: u64, key: &str) -> StoreResult<bool> {
        self.store.delete_meta(id, key).await
    }
}

/// Serializable form of a handle.
///
/// A snapshot holds names only. [`StoreLocator::restore`] resolves the
/// requested name again, so the restored handle reflects the overrides in
/// effect at restore time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// The name originally asked for.
    pub requested_name: String,
    /// The registry name that matched.
    pub object_type: String,
    /// Implementation name at snapshot time.
    pub class_name: String,
}
