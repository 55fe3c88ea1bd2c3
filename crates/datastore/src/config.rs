//! Locator configuration.

use datastore_backends::DatabaseConfig;
use serde::{Deserialize, Serialize};

/// Hook that receives and returns the whole name → implementation mapping.
pub const STORES_HOOK: &str = "data_stores";

/// Suffix of the per-name override hook, `"<name>_data_store"`.
pub const STORE_HOOK_SUFFIX: &str = "data_store";

/// Configuration for the [`StoreLocator`](crate::StoreLocator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    /// Separator between a base name and its subtype.
    pub separator: char,
    /// Prefix for hook names, joined with `_`.
    pub hook_namespace: Option<String>,
    /// Cache the merged mapping until the mapping hook changes.
    pub cache_mapping: bool,
    /// Database the SQLite-backed stores open.
    pub database: DatabaseConfig,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            separator: '_',
            hook_namespace: None,
            cache_mapping: false,
            database: DatabaseConfig::default(),
        }
    }
}

impl LocatorConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Name of the mapping hook.
    pub fn stores_hook(&self) -> String {
        self.namespaced(STORES_HOOK)
    }

    /// Name of the override hook for one registry name.
    pub fn store_hook(&self, name: &str) -> String {
        self.namespaced(&format!("{name}_{STORE_HOOK_SUFFIX}"))
    }

    fn namespaced(&self, hook: &str) -> String {
        match &self.hook_namespace {
            Some(ns) => format!("{ns}_{hook}"),
            None => hook.to_string(),
        }
    }
}
