//! Database schema migrations for SQLite.
//!
//! Shared tables are versioned: each migration transforms the schema from
//! version N to N+1. Dedicated entity tables are created on demand by
//! [`ensure_custom_table`], since their names depend on the entity.

use rusqlite::Connection;

use datastore_core::{Result, StoreError};

use crate::sqlite::now_millis;

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Initialize or migrate the database schema.
///
/// This function is idempotent - it can be called multiple times safely.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    let current: u32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;

    if current < CURRENT_VERSION {
        let tx = conn.transaction()?;

        for version in (current + 1)..=CURRENT_VERSION {
            apply_migration(&tx, version)?;

            tx.execute(
                "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
                rusqlite::params![version, now_millis()],
            )?;
        }

        tx.commit()?;
        tracing::debug!(from = current, to = CURRENT_VERSION, "Data store schema migrated");
    }

    Ok(())
}

/// Apply a specific migration version.
fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
    match version {
        1 => apply_v1(conn),
        _ => Err(StoreError::Migration(format!(
            "unknown migration version: {}",
            version
        ))),
    }
}

/// Migration v1: the shared content-object tables.
fn apply_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Objects of every entity type, partitioned by the owning store's scope
        CREATE TABLE objects (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            scope TEXT NOT NULL,              -- registry name of the owning store
            object_type TEXT NOT NULL,        -- the object's own type, may be a subtype
            props TEXT NOT NULL,              -- JSON object
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );

        -- Key/value metadata for objects
        CREATE TABLE object_meta (
            object_id INTEGER NOT NULL REFERENCES objects(id) ON DELETE CASCADE,
            meta_key TEXT NOT NULL,
            meta_value TEXT NOT NULL,
            PRIMARY KEY (object_id, meta_key)
        );

        CREATE INDEX idx_objects_scope ON objects(scope);
        "#,
    )?;

    Ok(())
}

/// Normalise an entity name into a table prefix.
///
/// `-` becomes `_`; the result must match `[a-z][a-z0-9_]*`.
pub fn table_prefix(entity: &str) -> Result<String> {
    let prefix = entity.replace('-', "_");
    let mut chars = prefix.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');

    if valid {
        Ok(prefix)
    } else {
        Err(StoreError::InvalidData(format!(
            "entity name {entity:?} cannot name a table"
        )))
    }
}

/// Create the dedicated `<prefix>_records` and `<prefix>_meta` tables.
///
/// `prefix` must come from [`table_prefix`].
pub fn ensure_custom_table(conn: &Connection, prefix: &str) -> Result<()> {
    conn.execute_batch(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {prefix}_records (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            object_type TEXT NOT NULL,
            props TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS {prefix}_meta (
            object_id INTEGER NOT NULL REFERENCES {prefix}_records(id) ON DELETE CASCADE,
            meta_key TEXT NOT NULL,
            meta_value TEXT NOT NULL,
            PRIMARY KEY (object_id, meta_key)
        );
        "#
    ))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_names(conn: &Connection) -> Vec<String> {
        conn.prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap()
    }

    #[test]
    fn test_migration_creates_tables() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();

        let tables = table_names(&conn);
        assert!(tables.contains(&"objects".to_string()));
        assert!(tables.contains(&"object_meta".to_string()));
        assert!(tables.contains(&"schema_migrations".to_string()));
    }

    #[test]
    fn test_migration_idempotent() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();
        migrate(&mut conn).unwrap();
        migrate(&mut conn).unwrap();

        let version: u32 = conn
            .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(version, CURRENT_VERSION);
    }

    #[test]
    fn test_custom_table_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_custom_table(&conn, "order_item").unwrap();
        ensure_custom_table(&conn, "order_item").unwrap();

        let tables = table_names(&conn);
        assert!(tables.contains(&"order_item_records".to_string()));
        assert!(tables.contains(&"order_item_meta".to_string()));
    }

    #[test]
    fn test_table_prefix() {
        assert_eq!(table_prefix("payment-token").unwrap(), "payment_token");
        assert_eq!(table_prefix("webhook").unwrap(), "webhook");
        assert!(table_prefix("").is_err());
        assert!(table_prefix("9lives").is_err());
        assert!(table_prefix("orders; DROP TABLE objects").is_err());
        assert!(table_prefix("Product").is_err());
    }
}
