//! SQLite key-value backend over the `kv_entries` table.
//!
//! # Invariants
//! - Every row is partitioned by `scope`; scopes never see each other's keys.
//! - Opening a session-scoped store wipes previous session rows.

use super::{KeyValueStore, StorageError, StorageResult};
use super::schema;
use log::info;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

/// Partition of the `kv_entries` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageScope {
    /// Survives restarts.
    Durable,
    /// Reset every time a session store is opened.
    Session,
}

impl StorageScope {
    fn as_db(self) -> &'static str {
        match self {
            Self::Durable => "durable",
            Self::Session => "session",
        }
    }
}

/// SQLite-backed key-value store bound to one scope.
pub struct SqliteKvStore {
    conn: Mutex<Connection>,
    scope: StorageScope,
}

impl SqliteKvStore {
    fn new(conn: Connection, scope: StorageScope) -> Self {
        Self {
            conn: Mutex::new(conn),
            scope,
        }
    }

    /// Opens a durable store at `path`, creating `kv_entries` when absent.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        Ok(Self::new(schema::open_file(path.as_ref())?, StorageScope::Durable))
    }

    /// Opens a session store at `path` and clears rows from earlier sessions.
    pub fn open_session(path: impl AsRef<Path>) -> StorageResult<Self> {
        let store = Self::new(schema::open_file(path.as_ref())?, StorageScope::Session);
        let cleared = store.clear_scope()?;
        info!("event=session_reset module=storage status=ok cleared={cleared}");
        Ok(store)
    }

    /// Opens a session store at `path`, continuing the previous session.
    pub fn attach_session(path: impl AsRef<Path>) -> StorageResult<Self> {
        Ok(Self::new(schema::open_file(path.as_ref())?, StorageScope::Session))
    }

    pub fn open_in_memory(scope: StorageScope) -> StorageResult<Self> {
        Ok(Self::new(schema::open_in_memory()?, scope))
    }

    pub fn scope(&self) -> StorageScope {
        self.scope
    }

    fn clear_scope(&self) -> StorageResult<usize> {
        let conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        let removed = conn.execute(
            "DELETE FROM kv_entries WHERE scope = ?1;",
            [self.scope.as_db()],
        )?;
        Ok(removed)
    }
}

impl KeyValueStore for SqliteKvStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        let value = conn
            .query_row(
                "SELECT value FROM kv_entries WHERE scope = ?1 AND key = ?2;",
                params![self.scope.as_db(), key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        conn.execute(
            "INSERT INTO kv_entries (scope, key, value)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(scope, key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![self.scope.as_db(), key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        conn.execute(
            "DELETE FROM kv_entries WHERE scope = ?1 AND key = ?2;",
            params![self.scope.as_db(), key],
        )?;
        Ok(())
    }
}
