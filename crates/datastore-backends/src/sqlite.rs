//! SQLite plumbing shared by the table-backed stores.
//!
//! Both [`ObjectTableStore`](crate::ObjectTableStore) and
//! [`CustomTableStore`](crate::CustomTableStore) are a [`TableStore`]
//! over a different [`TableLayout`]. Queries run in `spawn_blocking` on a
//! mutex-guarded connection.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};

use datastore_core::{DataObject, Result, StoreError};

use crate::config::DatabaseConfig;
use crate::migration;

/// How long a file-backed connection waits on a locked database.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// A migrated SQLite connection, shareable between stores.
///
/// Cloning shares the connection.
#[derive(Debug, Clone)]
pub struct SqliteDatabase {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteDatabase {
    /// Open the configured database and run migrations.
    pub fn open(config: &DatabaseConfig) -> Result<Self> {
        let mut conn = match config {
            DatabaseConfig::Memory => Connection::open_in_memory()?,
            DatabaseConfig::Path(path) => {
                let conn = Connection::open(path)?;
                conn.busy_timeout(BUSY_TIMEOUT)?;
                conn
            }
        };
        conn.pragma_update(None, "foreign_keys", true)?;
        migration::migrate(&mut conn)?;

        tracing::debug!(database = ?config, "SQLite data store database opened");

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open a private in-memory database.
    pub fn open_memory() -> Result<Self> {
        Self::open(&DatabaseConfig::Memory)
    }

    /// Execute a blocking operation on the connection from the current thread.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T>,
    {
        let mut conn = lock(&self.conn)?;
        f(&mut conn)
    }

    /// Execute a blocking operation on a worker thread.
    pub(crate) async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || {
            let mut conn = lock(&conn)?;
            f(&mut conn)
        })
        .await
        .map_err(|e| {
            StoreError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_ERROR),
                Some(format!("spawn_blocking failed: {}", e)),
            ))
        })?
    }
}

fn lock(conn: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>> {
    conn.lock().map_err(|e| {
        StoreError::Database(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_LOCKED),
            Some(format!("mutex poisoned: {}", e)),
        ))
    })
}

/// Get current time in milliseconds.
pub(crate) fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Convert a store id to an SQLite rowid.
fn rowid(id: u64) -> Result<i64> {
    i64::try_from(id)
        .map_err(|_| StoreError::InvalidData(format!("id {id} is out of rowid range")))
}

/// Which tables a store reads and writes.
#[derive(Debug, Clone)]
pub(crate) struct TableLayout {
    /// Record table name.
    records: String,
    /// Meta table name.
    meta: String,
    /// Row partition within a shared table. `None` for dedicated tables.
    scope: Option<String>,
}

impl TableLayout {
    /// The shared `objects` table, partitioned by `scope`.
    pub(crate) fn shared(scope: impl Into<String>) -> Self {
        Self {
            records: "objects".into(),
            meta: "object_meta".into(),
            scope: Some(scope.into()),
        }
    }

    /// Dedicated tables for one entity. `prefix` is already validated.
    pub(crate) fn dedicated(prefix: &str) -> Self {
        Self {
            records: format!("{prefix}_records"),
            meta: format!("{prefix}_meta"),
            scope: None,
        }
    }

    pub(crate) fn records(&self) -> &str {
        &self.records
    }

    pub(crate) fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    /// `WHERE` clause selecting one record, with placeholders from `?{first}`.
    fn key_clause(&self, first: usize) -> String {
        match self.scope {
            Some(_) => format!("id = ?{} AND scope = ?{}", first, first + 1),
            None => format!("id = ?{}", first),
        }
    }

    fn key_args(&self, id: u64) -> Result<Vec<Value>> {
        let mut args = vec![Value::Integer(rowid(id)?)];
        if let Some(scope) = &self.scope {
            args.push(Value::Text(scope.clone()));
        }
        Ok(args)
    }

    fn exists(&self, conn: &Connection, id: u64) -> Result<bool> {
        let sql = format!("SELECT 1 FROM {} WHERE {}", self.records, self.key_clause(1));
        let found: Option<i64> = conn
            .query_row(&sql, params_from_iter(self.key_args(id)?), |row| row.get(0))
            .optional()?;
        Ok(found.is_some())
    }

    fn insert(&self, conn: &Connection, object_type: String, props: String) -> Result<u64> {
        let (sql, mut args) = match &self.scope {
            Some(scope) => (
                format!(
                    "INSERT INTO {} (scope, object_type, props, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?4)",
                    self.records
                ),
                vec![Value::Text(scope.clone())],
            ),
            None => (
                format!(
                    "INSERT INTO {} (object_type, props, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?3)",
                    self.records
                ),
                Vec::new(),
            ),
        };
        args.extend([
            Value::Text(object_type),
            Value::Text(props),
            Value::Integer(now_millis()),
        ]);

        conn.execute(&sql, params_from_iter(args))?;
        Ok(conn.last_insert_rowid() as u64)
    }

    fn select(&self, conn: &Connection, id: u64) -> Result<Option<DataObject>> {
        let sql = format!(
            "SELECT id, object_type, props FROM {} WHERE {}",
            self.records,
            self.key_clause(1)
        );
        let row: Option<(i64, String, String)> = conn
            .query_row(&sql, params_from_iter(self.key_args(id)?), |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?))
            })
            .optional()?;

        row.map(|(id, object_type, props)| -> Result<DataObject> {
            Ok(DataObject {
                id: Some(id as u64),
                object_type,
                props: serde_json::from_str(&props)?,
            })
        })
        .transpose()
    }

    fn rewrite(&self, conn: &Connection, id: u64, object_type: String, props: String) -> Result<()> {
        let sql = format!(
            "UPDATE {} SET object_type = ?1, props = ?2, updated_at = ?3 WHERE {}",
            self.records,
            self.key_clause(4)
        );
        let mut args = vec![
            Value::Text(object_type),
            Value::Text(props),
            Value::Integer(now_millis()),
        ];
        args.extend(self.key_args(id)?);

        let changed = conn.execute(&sql, params_from_iter(args))?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!("{} #{}", self.records, id)));
        }
        Ok(())
    }

    fn remove(&self, conn: &mut Connection, id: u64) -> Result<bool> {
        let key = rowid(id)?;
        let tx = conn.transaction()?;
        if !self.exists(&tx, id)? {
            return Ok(false);
        }

        tx.execute(
            &format!("DELETE FROM {} WHERE object_id = ?1", self.meta),
            params![key],
        )?;
        tx.execute(
            &format!("DELETE FROM {} WHERE id = ?1", self.records),
            params![key],
        )?;
        tx.commit()?;

        Ok(true)
    }

    fn select_meta(&self, conn: &Connection, id: u64) -> Result<BTreeMap<String, String>> {
        if !self.exists(conn, id)? {
            return Ok(BTreeMap::new());
        }

        let mut stmt = conn.prepare(&format!(
            "SELECT meta_key, meta_value FROM {} WHERE object_id = ?1",
            self.meta
        ))?;
        let entries = stmt
            .query_map(params![rowid(id)?], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<BTreeMap<String, String>>>()?;

        Ok(entries)
    }

    fn upsert_meta(&self, conn: &Connection, id: u64, key: &str, value: &str) -> Result<()> {
        if !self.exists(conn, id)? {
            return Err(StoreError::NotFound(format!("{} #{}", self.records, id)));
        }

        conn.execute(
            &format!(
                "INSERT INTO {} (object_id, meta_key, meta_value) VALUES (?1, ?2, ?3)
                 ON CONFLICT(object_id, meta_key) DO UPDATE SET meta_value = excluded.meta_value",
                self.meta
            ),
            params![rowid(id)?, key, value],
        )?;
        Ok(())
    }

    fn remove_meta(&self, conn: &Connection, id: u64, key: &str) -> Result<bool> {
        if !self.exists(conn, id)? {
            return Ok(false);
        }

        let changed = conn.execute(
            &format!(
                "DELETE FROM {} WHERE object_id = ?1 AND meta_key = ?2",
                self.meta
            ),
            params![rowid(id)?, key],
        )?;
        Ok(changed > 0)
    }
}

/// A [`TableLayout`] bound to a database; the engine behind both SQLite stores.
#[derive(Debug, Clone)]
pub(crate) struct TableStore {
    db: SqliteDatabase,
    layout: Arc<TableLayout>,
}

impl TableStore {
    pub(crate) fn new(db: SqliteDatabase, layout: TableLayout) -> Self {
        Self {
            db,
            layout: Arc::new(layout),
        }
    }

    pub(crate) fn layout(&self) -> &TableLayout {
        &self.layout
    }

    pub(crate) async fn create(&self, object: &mut DataObject) -> Result<()> {
        if let Some(id) = object.id {
            return Err(StoreError::InvalidData(format!(
                "object already has id {id}"
            )));
        }

        let object_type = object.object_type.clone();
        let props = serde_json::to_string(&object.props)?;
        let layout = self.layout.clone();

        let id = self
            .db
            .run(move |conn| layout.insert(conn, object_type, props))
            .await?;
        object.id = Some(id);

        Ok(())
    }

    pub(crate) async fn read(&self, id: u64) -> Result<Option<DataObject>> {
        let layout = self.layout.clone();
        self.db.run(move |conn| layout.select(conn, id)).await
    }

    pub(crate) async fn update(&self, object: &DataObject) -> Result<()> {
        let id = object
            .id
            .ok_or_else(|| StoreError::NotFound("object has no id".into()))?;
        let object_type = object.object_type.clone();
        let props = serde_json::to_string(&object.props)?;
        let layout = self.layout.clone();

        self.db
            .run(move |conn| layout.rewrite(conn, id, object_type, props))
            .await
    }

    pub(crate) async fn delete(&self, id: u64) -> Result<bool> {
        let layout = self.layout.clone();
        self.db.run(move |conn| layout.remove(conn, id)).await
    }

    pub(crate) async fn read_meta(&self, id: u64) -> Result<BTreeMap<String, String>> {
        let layout = self.layout.clone();
        self.db.run(move |conn| layout.select_meta(conn, id)).await
    }

    pub(crate) async fn update_meta(&self, id: u64, key: &str, value: &str) -> Result<()> {
        let layout = self.layout.clone();
        let (key, value) = (key.to_string(), value.to_string());
        self.db
            .run(move |conn| layout.upsert_meta(conn, id, &key, &value))
            .await
    }

    pub(crate) async fn delete_meta(&self, id: u64, key: &str) -> Result<bool> {
        let layout = self.layout.clone();
        let key = key.to_string();
        self.db
            .run(move |conn| layout.remove_meta(conn, id, &key))
            .await
    }
}
