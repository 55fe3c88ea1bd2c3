//! Default registry: built-in entity names and the implementations behind them.
//!
//! A [`StoreImpl`] is a named factory. The mapping from entity name to
//! implementation starts from [`DefaultRegistry::build`] and is then passed
//! through the mapping hook so external code can add, replace, or remove
//! entries.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use datastore_backends::{
    CustomTableStore, DatabaseConfig, MemoryStore, ObjectTableStore, SqliteDatabase,
};
use datastore_core::{DataStore, Result as StoreResult};
use datastore_hooks::HookDispatcher;

use crate::config::LocatorConfig;

/// What a factory learns about the store it is building.
#[derive(Debug, Clone, Copy)]
pub struct StoreContext<'a> {
    /// The registry name that matched, e.g. `"product"` for `"product_sub"`.
    pub object_type: &'a str,
    /// Configuration of the locator doing the resolving.
    pub config: &'a LocatorConfig,
    /// The locator's database, shared by every table-backed store it builds.
    pub database: &'a SharedDatabase,
}

/// A SQLite database opened on first use and shared from then on.
///
/// A failed open is not remembered; the next [`get`](Self::get) tries again.
#[derive(Debug)]
pub struct SharedDatabase {
    config: DatabaseConfig,
    db: Mutex<Option<SqliteDatabase>>,
}

impl SharedDatabase {
    /// A database that will be opened from `config` when first needed.
    pub fn new(config: DatabaseConfig) -> Self {
        Self {
            config,
            db: Mutex::new(None),
        }
    }

    /// The open database, opening and migrating it if this is the first call.
    pub fn get(&self) -> StoreResult<SqliteDatabase> {
        let mut slot = self.db.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(db) = slot.as_ref() {
            return Ok(db.clone());
        }

        let db = SqliteDatabase::open(&self.config)?;
        *slot = Some(db.clone());
        Ok(db)
    }

    /// Whether the database has been opened yet.
    pub fn is_open(&self) -> bool {
        self.db
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

type Factory = dyn Fn(&StoreContext<'_>) -> StoreResult<Arc<dyn DataStore>> + Send + Sync;

/// An implementation identifier: a canonical class name and its constructor.
///
/// Two `StoreImpl`s are equal when their names are.
#[derive(Clone)]
pub struct StoreImpl {
    name: Arc<str>,
    factory: Arc<Factory>,
}

impl StoreImpl {
    /// Name of the [`MemoryStore`] implementation.
    pub const MEMORY: &'static str = "MemoryStore";
    /// Name of the [`ObjectTableStore`] implementation.
    pub const OBJECT_TABLE: &'static str = "ObjectTableStore";
    /// Name of the [`CustomTableStore`] implementation.
    pub const CUSTOM_TABLE: &'static str = "CustomTableStore";

    /// Create an implementation from a name and a factory.
    pub fn new<F>(name: impl AsRef<str>, factory: F) -> Self
    where
        F: Fn(&StoreContext<'_>) -> StoreResult<Arc<dyn DataStore>> + Send + Sync + 'static,
    {
        Self {
            name: Arc::from(name.as_ref()),
            factory: Arc::new(factory),
        }
    }

    /// An implementation built with `S::default()`.
    pub fn of<S>(name: impl AsRef<str>) -> Self
    where
        S: DataStore + Default + 'static,
    {
        Self::new(name, |_| Ok(Arc::new(S::default()) as Arc<dyn DataStore>))
    }

    /// A fresh [`MemoryStore`] per instantiation.
    pub fn memory() -> Self {
        Self::of::<MemoryStore>(Self::MEMORY)
    }

    /// An [`ObjectTableStore`] scoped to the resolved object type, over the
    /// locator's shared database.
    pub fn object_table() -> Self {
        Self::new(Self::OBJECT_TABLE, |ctx| {
            let store = ObjectTableStore::new(ctx.database.get()?, ctx.object_type);
            Ok(Arc::new(store) as Arc<dyn DataStore>)
        })
    }

    /// A [`CustomTableStore`] over the resolved object type's own tables in
    /// the locator's shared database.
    pub fn custom_table() -> Self {
        Self::new(Self::CUSTOM_TABLE, |ctx| {
            let store = CustomTableStore::new(ctx.database.get()?, ctx.object_type)?;
            Ok(Arc::new(store) as Arc<dyn DataStore>)
        })
    }

    /// The canonical class name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Build a live store.
    pub fn instantiate(&self, ctx: &StoreContext<'_>) -> StoreResult<Arc<dyn DataStore>> {
        (self.factory)(ctx)
    }
}

impl PartialEq for StoreImpl {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for StoreImpl {}

impl fmt::Debug for StoreImpl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StoreImpl").field(&self.name).finish()
    }
}

impl fmt::Display for StoreImpl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Entity name → implementation.
pub type StoreMapping = BTreeMap<String, StoreImpl>;

/// The compile-time registry of built-in stores.
pub struct DefaultRegistry;

impl DefaultRegistry {
    /// Entities kept in the shared content-object table.
    pub const OBJECT_TABLE_ENTITIES: &'static [&'static str] =
        &["coupon", "order", "product", "product-variation"];

    /// Entities with tables of their own.
    pub const CUSTOM_TABLE_ENTITIES: &'static [&'static str] = &[
        "customer",
        "customer-download",
        "order-item",
        "payment-token",
        "shipping-zone",
        "webhook",
    ];

    /// The built-in defaults.
    pub fn build() -> StoreMapping {
        let object_table = StoreImpl::object_table();
        let custom_table = StoreImpl::custom_table();

        let shared = Self::OBJECT_TABLE_ENTITIES
            .iter()
            .map(|name| (name.to_string(), object_table.clone()));
        let dedicated = Self::CUSTOM_TABLE_ENTITIES
            .iter()
            .map(|name| (name.to_string(), custom_table.clone()));

        shared.chain(dedicated).collect()
    }

    /// Pass `base` through the mapping hook and return what comes back.
    ///
    /// The result is not validated; a bad entry only shows up when it is
    /// instantiated.
    pub fn merge_with_external(
        hooks: &HookDispatcher,
        config: &LocatorConfig,
        base: StoreMapping,
    ) -> StoreMapping {
        hooks.invoke(&config.stores_hook(), base)
    }
}
