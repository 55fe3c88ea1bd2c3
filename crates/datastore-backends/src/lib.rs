//! # Data Store Backends
//!
//! Concrete implementations of [`DataStore`](datastore_core::DataStore).
//!
//! ## Key Types
//!
//! - [`MemoryStore`] - Maps behind an `RwLock`, for tests and ephemeral use
//! - [`ObjectTableStore`] - Every entity type in one shared `objects` table
//! - [`CustomTableStore`] - A dedicated `<entity>_records` table per entity
//! - [`SqliteDatabase`] - Connection handle shared by the SQLite stores
//!
//! ## Usage
//!
//! ```rust,no_run
//! use datastore_backends::{DatabaseConfig, ObjectTableStore, SqliteDatabase};
//! use datastore_core::{DataObject, DataStore};
//!
//! async fn example() {
//!     let db = SqliteDatabase::open(&DatabaseConfig::Memory).unwrap();
//!     let products = ObjectTableStore::new(db.clone(), "product");
//!
//!     let mut widget = DataObject::new("product").with_prop("name", "Widget");
//!     products.create(&mut widget).await.unwrap();
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Scoped shared table**: two `ObjectTableStore`s over one database only
//!   see their own rows.
//! - **Blocking I/O off the runtime**: SQLite calls run in `spawn_blocking`.

pub mod config;
pub mod custom_table;
pub mod memory;
pub mod migration;
pub mod object_table;
pub mod sqlite;

pub use config::DatabaseConfig;
pub use custom_table::CustomTableStore;
pub use memory::MemoryStore;
pub use object_table::ObjectTableStore;
pub use sqlite::SqliteDatabase;
