//! Where the SQLite stores keep their data.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Database location for the SQLite-backed stores.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatabaseConfig {
    /// A private in-memory database per open.
    #[default]
    Memory,
    /// A database file, created if missing.
    Path(PathBuf),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_forms() {
        let memory: DatabaseConfig = serde_json::from_str(r#""memory""#).unwrap();
        assert_eq!(memory, DatabaseConfig::Memory);

        let path: DatabaseConfig = serde_json::from_str(r#"{"path":"/tmp/shop.db"}"#).unwrap();
        assert_eq!(path, DatabaseConfig::Path(PathBuf::from("/tmp/shop.db")));
    }
}
