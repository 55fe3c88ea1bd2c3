//! # Data Store Testkit
//!
//! Testing utilities for the data store locator.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: a fresh dispatcher and locator per test, plus swappable dummy stores
//! - **Generators**: proptest strategies for store names
//!
//! ## Test Fixtures
//!
//! ```rust
//! use datastore_testkit::fixtures::{TestFixture, DUMMY_CUSTOM_TABLE_STORE, DUMMY_OBJECT_STORE};
//!
//! let fixture = TestFixture::new();
//! fixture.load_dummy_store();
//! assert_eq!(fixture.class_of("dummy"), Some(DUMMY_OBJECT_STORE.to_string()));
//!
//! fixture.swap_dummy_store();
//! assert_eq!(fixture.class_of("dummy"), Some(DUMMY_CUSTOM_TABLE_STORE.to_string()));
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use datastore_testkit::generators::unregistered_name;
//!
//! proptest! {
//!     #[test]
//!     fn unknown_names_are_empty(name in unregistered_name()) {
//!         let fixture = datastore_testkit::TestFixture::new();
//!         prop_assert!(fixture.locator.load(&name).unwrap().is_none());
//!     }
//! }
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::{
    dummy_custom_table_store, dummy_object_store, TestFixture, DUMMY_CUSTOM_TABLE_STORE,
    DUMMY_OBJECT_STORE,
};
pub use generators::{compound_name, simple_name, unregistered_name};
