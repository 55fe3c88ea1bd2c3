//! The store locator: turns an entity name into a live store.
//!
//! Resolution, in order:
//!
//! 1. Merge the default registry with the mapping hook.
//! 2. Look the name up. If absent and compound, look up the part before the
//!    first separator instead. There is no second fallback step.
//! 3. Pass the chosen implementation through `"<matched>_data_store"`.
//! 4. Instantiate it and wrap it in a [`DataStoreHandle`].

use std::sync::{Arc, Mutex, PoisonError};

use datastore_hooks::HookDispatcher;
use tracing::debug;

use crate::config::LocatorConfig;
use crate::error::{LocatorError, Result};
use crate::handle::{DataStoreHandle, StoreSnapshot};
use crate::registry::{DefaultRegistry, SharedDatabase, StoreContext, StoreImpl, StoreMapping};

/// Merged mapping tagged with the mapping-hook generation it was built at.
struct CachedMapping {
    generation: u64,
    mapping: Arc<StoreMapping>,
}

/// Resolves entity names to stores.
///
/// The locator keeps no per-name state. With `cache_mapping` off (the
/// default) every resolution rebuilds the merged mapping; with it on, the
/// mapping is rebuilt whenever the mapping hook's generation changes.
/// Per-name override hooks are always evaluated afresh.
///
/// Table-backed stores built by one locator share a single database,
/// opened from `config.database` on the first resolution that needs it.
pub struct StoreLocator {
    hooks: HookDispatcher,
    config: LocatorConfig,
    database: SharedDatabase,
    cache: Mutex<Option<CachedMapping>>,
}

impl StoreLocator {
    /// Create a locator over a hook dispatcher.
    pub fn new(hooks: HookDispatcher, config: LocatorConfig) -> Self {
        Self {
            hooks,
            database: SharedDatabase::new(config.database.clone()),
            config,
            cache: Mutex::new(None),
        }
    }

    /// Create a locator with the default configuration.
    pub fn with_hooks(hooks: HookDispatcher) -> Self {
        Self::new(hooks, LocatorConfig::default())
    }

    /// The dispatcher overrides are read from.
    pub fn hooks(&self) -> &HookDispatcher {
        &self.hooks
    }

    /// The locator configuration.
    pub fn config(&self) -> &LocatorConfig {
        &self.config
    }

    /// The database shared by this locator's table-backed stores.
    pub fn database(&self) -> &SharedDatabase {
        &self.database
    }

    /// The current merged name → implementation mapping.
    pub fn mapping(&self) -> Arc<StoreMapping> {
        let hook = self.config.stores_hook();
        if !self.config.cache_mapping {
            return Arc::new(self.merge());
        }

        let generation = self.hooks.generation(&hook);
        {
            let cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
            match cache.as_ref() {
                Some(cached) if cached.generation == generation => return cached.mapping.clone(),
                Some(cached) => debug!(
                    hook = %hook,
                    cached = cached.generation,
                    current = generation,
                    "Store mapping cache invalidated"
                ),
                None => {}
            }
        }

        // Built outside the lock: mapping callbacks may resolve stores themselves.
        let mapping = Arc::new(self.merge());
        *self.cache.lock().unwrap_or_else(PoisonError::into_inner) = Some(CachedMapping {
            generation,
            mapping: mapping.clone(),
        });
        mapping
    }

    /// Resolve `name` to a store.
    ///
    /// Returns `NotFound` when neither `name` nor its base name is
    /// registered, and `Instantiation` when the chosen implementation fails
    /// to build.
    pub fn resolve(&self, name: &str) -> Result<DataStoreHandle> {
        let mapping = self.mapping();

        let (matched, candidate) = lookup(&mapping, name, self.config.separator).ok_or_else(|| {
            debug!(name = %name, "No data store registered");
            LocatorError::NotFound {
                name: name.to_string(),
            }
        })?;

        if matched != name {
            debug!(name = %name, base = %matched, "Falling back to base data store");
        }

        let chosen = self
            .hooks
            .invoke(&self.config.store_hook(matched), candidate.clone());
        if chosen != *candidate {
            debug!(
                name = %matched,
                default = %candidate,
                chosen = %chosen,
                "Data store overridden by hook"
            );
        }

        let ctx = StoreContext {
            object_type: matched,
            config: &self.config,
            database: &self.database,
        };
        let store = chosen
            .instantiate(&ctx)
            .map_err(|source| LocatorError::Instantiation {
                class: chosen.name().to_string(),
                source,
            })?;

        debug!(name = %name, class = %chosen, "Data store resolved");
        Ok(DataStoreHandle::from_parts(name, matched, chosen, store))
    }

    /// Resolve a store that must exist.
    ///
    /// An unregistered name is an `InvalidStore` error.
    pub fn get(&self, name: &str) -> Result<DataStoreHandle> {
        match self.resolve(name) {
            Err(LocatorError::NotFound { name }) => Err(LocatorError::InvalidStore { name }),
            other => other,
        }
    }

    /// Resolve a store that may not exist.
    ///
    /// An unregistered name is `Ok(None)`. Instantiation failures are still errors.
    pub fn load(&self, name: &str) -> Result<Option<DataStoreHandle>> {
        match self.resolve(name) {
            Ok(handle) => Ok(Some(handle)),
            Err(LocatorError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Rebuild a handle from a snapshot by resolving its requested name again.
    pub fn restore(&self, snapshot: &StoreSnapshot) -> Result<DataStoreHandle> {
        self.get(&snapshot.requested_name)
    }

    fn merge(&self) -> StoreMapping {
        DefaultRegistry::merge_with_external(&self.hooks, &self.config, DefaultRegistry::build())
    }
}

/// Find the entry for `name`, or for its base name if `name` is compound.
///
/// Returns the key that matched alongside its implementation.
fn lookup<'m>(
    mapping: &'m StoreMapping,
    name: &str,
    separator: char,
) -> Option<(&'m str, &'m StoreImpl)> {
    if let Some((key, implementation)) = mapping.get_key_value(name) {
        return Some((key.as_str(), implementation));
    }

    let (base, _) = name.split_once(separator)?;
    mapping
        .get_key_value(base)
        .map(|(key, implementation)| (key.as_str(), implementation))
}
