//! # Data Store
//!
//! Resolves logical entity names (`"product"`, `"order"`) to the storage
//! backend responsible for them, while letting external code swap those
//! backends at runtime through hooks.
//!
//! ## Overview
//!
//! - **Default registry**: built-in name → implementation entries
//! - **Mapping hook** (`"data_stores"`): external code adds, replaces, or removes entries
//! - **Override hook** (`"<name>_data_store"`): external code swaps one entry per resolution
//! - **Subtype fallback**: `"product_sub"` resolves through `"product"` when unregistered
//!
//! ## Usage
//!
//! ```rust
//! use datastore::{DataStoreHandle, HookDispatcher, StoreImpl, StoreLocator, StoreMapping};
//!
//! let hooks = HookDispatcher::new();
//! hooks.register("data_stores", |mut stores: StoreMapping| {
//!     stores.insert("dummy".into(), StoreImpl::memory());
//!     stores
//! });
//!
//! let locator = StoreLocator::with_hooks(hooks.clone());
//! let store = DataStoreHandle::new(&locator, "dummy").unwrap();
//! assert_eq!(store.current_class_name(), "MemoryStore");
//!
//! hooks.register("dummy_data_store", |_: StoreImpl| StoreImpl::object_table());
//! let store = locator.get("dummy").unwrap();
//! assert_eq!(store.current_class_name(), "ObjectTableStore");
//!
//! // Subtypes fall back one level; unknown names are invalid.
//! assert!(locator.load("dummy_sub").unwrap().is_some());
//! assert!(locator.load("bogus").unwrap().is_none());
//! assert_eq!(locator.get("bogus").unwrap_err().to_string(), "Invalid data store.");
//! ```
//!
//! ## Re-exports
//!
//! - `datastore::core` - The capability contract (`DataStore`, `DataObject`)
//! - `datastore::hooks` - The hook dispatcher
//! - `datastore::backends` - Memory and SQLite stores

pub mod config;
pub mod error;
pub mod handle;
pub mod locator;
pub mod registry;

// Re-export component crates
pub use datastore_backends as backends;
pub use datastore_core as core;
pub use datastore_hooks as hooks;

// Re-export main types for convenience
pub use config::{LocatorConfig, STORES_HOOK, STORE_HOOK_SUFFIX};
pub use error::{LocatorError, Result};
pub use handle::{DataStoreHandle, StoreSnapshot};
pub use locator::StoreLocator;
pub use registry::{DefaultRegistry, SharedDatabase, StoreContext, StoreImpl, StoreMapping};

// Re-export commonly used component types
pub use datastore_backends::DatabaseConfig;
pub use datastore_core::{DataObject, DataStore, DataStoreExt, StoreError};
pub use datastore_hooks::HookDispatcher;
