//! Proptest strategies for store names.

use datastore::DefaultRegistry;
use proptest::prelude::*;

/// A lower-case name without separators.
pub fn simple_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,11}"
}

/// A simple name that is not one of the built-in registry entries.
pub fn unregistered_name() -> impl Strategy<Value = String> {
    simple_name().prop_filter("built-in store name", |name| {
        !DefaultRegistry::build().contains_key(name)
    })
}

/// `base` joined to one or more generated segments with `_`.
pub fn compound_name(base: String) -> impl Strategy<Value = String> {
    proptest::collection::vec(simple_name(), 1..4)
        .prop_map(move |segments| format!("{}_{}", base, segments.join("_")))
}
