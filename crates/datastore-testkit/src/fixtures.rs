//! Test fixtures and helpers.
//!
//! Two interchangeable dummy stores stand in for a content-object backend
//! and a dedicated-table backend, so tests can swap one for the other.

use datastore::backends::MemoryStore;
use datastore::{HookDispatcher, LocatorConfig, StoreImpl, StoreLocator, StoreMapping};

/// Class name of the default dummy store.
pub const DUMMY_OBJECT_STORE: &str = "DummyObjectTableStore";

/// Class name of the replacement dummy store.
pub const DUMMY_CUSTOM_TABLE_STORE: &str = "DummyCustomTableStore";

/// The default implementation registered for `"dummy"`.
pub fn dummy_object_store() -> StoreImpl {
    StoreImpl::of::<MemoryStore>(DUMMY_OBJECT_STORE)
}

/// The implementation a swap test replaces the default with.
pub fn dummy_custom_table_store() -> StoreImpl {
    StoreImpl::of::<MemoryStore>(DUMMY_CUSTOM_TABLE_STORE)
}

/// A fresh dispatcher and a locator reading from it.
pub struct TestFixture {
    pub hooks: HookDispatcher,
    pub locator: StoreLocator,
}

impl TestFixture {
    /// Create a fixture with the default configuration.
    pub fn new() -> Self {
        Self::with_config(LocatorConfig::default())
    }

    /// Create a fixture with an explicit configuration.
    pub fn with_config(config: LocatorConfig) -> Self {
        let hooks = HookDispatcher::new();
        Self {
            locator: StoreLocator::new(hooks.clone(), config),
            hooks,
        }
    }

    /// Register the `"dummy"` store through the mapping hook.
    pub fn load_dummy_store(&self) {
        self.register_store("dummy", dummy_object_store());
    }

    /// Override `"dummy"` with the replacement store.
    pub fn swap_dummy_store(&self) {
        self.override_store("dummy", dummy_custom_table_store());
    }

    /// Override `"dummy"` back to the default store.
    pub fn restore_dummy_store(&self) {
        self.override_store("dummy", dummy_object_store());
    }

    /// Add or replace a mapping entry through the mapping hook.
    pub fn register_store(&self, name: &str, implementation: StoreImpl) {
        let name = name.to_string();
        self.hooks
            .register(self.locator.config().stores_hook(), move |mut stores: StoreMapping| {
                stores.insert(name.clone(), implementation.clone());
                stores
            });
    }

    /// Register a per-name override that always returns `implementation`.
    pub fn override_store(&self, name: &str, implementation: StoreImpl) {
        self.hooks
            .register(self.locator.config().store_hook(name), move |_: StoreImpl| {
                implementation.clone()
            });
    }

    /// Class name `load(name)` resolves to, if any.
    pub fn class_of(&self, name: &str) -> Option<String> {
        self.locator
            .load(name)
            .ok()
            .flatten()
            .map(|handle| handle.current_class_name())
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
