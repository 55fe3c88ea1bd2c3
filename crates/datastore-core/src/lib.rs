//! # Data Store Core
//!
//! The capability contract every persistence backend satisfies.
//!
//! This crate contains no backend and no resolution logic. It defines the
//! shape that the locator hands back to callers and that backends implement.
//!
//! ## Key Types
//!
//! - [`DataStore`] - The async trait for object persistence
//! - [`DataObject`] - A typed bag of properties with an optional id
//! - [`StoreError`] - Errors surfaced by backends

pub mod error;
pub mod object;
pub mod traits;

pub use error::{Result, StoreError};
pub use object::DataObject;
pub use traits::{DataStore, DataStoreExt};
