//! In-memory implementation of the DataStore trait.
//!
//! Same semantics as the SQLite stores, nothing persisted.

use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use datastore_core::{DataObject, DataStore, Result, StoreError};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

struct MemoryStoreInner {
    /// Last id handed out.
    last_id: u64,

    /// Objects indexed by id.
    objects: HashMap<u64, DataObject>,

    /// Meta entries indexed by object id.
    meta: HashMap<u64, BTreeMap<String, String>>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner {
                last_id: 0,
                objects: HashMap::new(),
                meta: HashMap::new(),
            }),
        }
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.read_inner().objects.len()
    }

    /// Whether the store holds no objects.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read_inner(&self) -> RwLockReadGuard<'_, MemoryStoreInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_inner(&self) -> RwLockWriteGuard<'_, MemoryStoreInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn not_found(id: u64) -> StoreError {
    StoreError::NotFound(format!("object {id}"))
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn create(&self, object: &mut DataObject) -> Result<()> {
        if let Some(id) = object.id {
            return Err(StoreError::InvalidData(format!(
                "object already has id {id}"
            )));
        }

        let mut inner = self.write_inner();
        inner.last_id += 1;
        let id = inner.last_id;

        object.id = Some(id);
        inner.objects.insert(id, object.clone());

        Ok(())
    }

    async fn read(&self, id: u64) -> Result<Option<DataObject>> {
        Ok(self.read_inner().objects.get(&id).cloned())
    }

    async fn update(&self, object: &DataObject) -> Result<()> {
        let id = object
            .id
            .ok_or_else(|| StoreError::NotFound("object has no id".into()))?;

        let mut inner = self.write_inner();
        match inner.objects.get_mut(&id) {
            Some(existing) => {
                *existing = object.clone();
                Ok(())
            }
            None => Err(not_found(id)),
        }
    }

    async fn delete(&self, id: u64) -> Result<bool> {
        let mut inner = self.write_inner();
        inner.meta.remove(&id);
        Ok(inner.objects.remove(&id).is_some())
    }

    async fn read_meta(&self, id: u64) -> Result<BTreeMap<String, String>> {
        Ok(self.read_inner().meta.get(&id).cloned().unwrap_or_default())
    }

    async fn update_meta(&self, id: u64, key: &str, value: &str) -> Result<()> {
        let mut inner = self.write_inner();
        if !inner.objects.contains_key(&id) {
            return Err(not_found(id));
        }
        inner
            .meta
            .entry(id)
            .or_default()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete_meta(&self, id: u64, key: &str) -> Result<bool> {
        let mut inner = self.write_inner();
        Ok(inner
            .meta
            .get_mut(&id)
            .map(|entries| entries.remove(key).is_some())
            .unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let store = MemoryStore::new();
        let mut a = DataObject::new("product");
        let mut b = DataObject::new("product");

        store.create(&mut a).await.unwrap();
        store.create(&mut b).await.unwrap();

        assert_eq!(a.id, Some(1));
        assert_eq!(b.id, Some(2));
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_create_rejects_saved_object() {
        let store = MemoryStore::new();
        let mut obj = DataObject::new("product");
        store.create(&mut obj).await.unwrap();

        let err = store.create(&mut obj).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidData(_)));
    }

    #[tokio::test]
    async fn test_update_and_read() {
        let store = MemoryStore::new();
        let mut obj = DataObject::new("order").with_prop("total", 10);
        store.create(&mut obj).await.unwrap();

        obj.set_prop("total", 25);
        store.update(&obj).await.unwrap();

        let read = store.read(1).await.unwrap().unwrap();
        assert_eq!(read.prop("total"), Some(&serde_json::Value::from(25)));
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let store = MemoryStore::new();
        let mut obj = DataObject::new("order");
        assert!(matches!(
            store.update(&obj).await.unwrap_err(),
            StoreError::NotFound(_)
        ));

        obj.id = Some(99);
        assert!(matches!(
            store.update(&obj).await.unwrap_err(),
            StoreError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_meta_lifecycle() {
        let store = MemoryStore::new();
        let mut obj = DataObject::new("coupon");
        store.create(&mut obj).await.unwrap();

        store.update_meta(1, "code", "SPRING").await.unwrap();
        store.update_meta(1, "code", "SUMMER").await.unwrap();
        store.update_meta(1, "amount", "5").await.unwrap();

        let meta = store.read_meta(1).await.unwrap();
        assert_eq!(meta.len(), 2);
        assert_eq!(meta["code"], "SUMMER");

        assert!(store.delete_meta(1, "code").await.unwrap());
        assert!(!store.delete_meta(1, "code").await.unwrap());

        assert!(matches!(
            store.update_meta(2, "code", "X").await.unwrap_err(),
            StoreError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_delete_drops_meta() {
        let store = MemoryStore::new();
        let mut obj = DataObject::new("coupon");
        store.create(&mut obj).await.unwrap();
        store.update_meta(1, "code", "SPRING").await.unwrap();

        assert!(store.delete(1).await.unwrap());
        assert!(!store.delete(1).await.unwrap());
        assert!(store.read(1).await.unwrap().is_none());
        assert!(store.read_meta(1).await.unwrap().is_empty());
        assert!(store.is_empty());
    }
}
