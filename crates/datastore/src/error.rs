//! Error types for store resolution.

use datastore_core::StoreError;
use thiserror::Error;

/// Errors that can occur while resolving a data store.
#[derive(Debug, Error)]
pub enum LocatorError {
    /// No registry entry for the name or its base name.
    ///
    /// Only [`StoreLocator::resolve`](crate::StoreLocator::resolve) returns
    /// this; the strict path turns it into `InvalidStore` and the tolerant
    /// path into `None`.
    #[error("no data store registered for {name:?}")]
    NotFound { name: String },

    /// A store that must exist was not registered.
    #[error("Invalid data store.")]
    InvalidStore { name: String },

    /// A registry entry was found but its implementation could not be built.
    #[error("data store {class} could not be instantiated: {source}")]
    Instantiation { class: String, source: StoreError },
}

/// Result type for locator operations.
pub type Result<T> = std::result::Result<T, LocatorError>;
