//! Connection bootstrap for the `kv_entries` table.
//!
//! # Invariants
//! - The schema version lives in `PRAGMA user_version`.
//! - A connection is handed out only once `kv_entries` exists.
//! - A database written by a newer binary is never touched.

use super::{StorageError, StorageResult};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

/// `user_version` of a database holding the current `kv_entries` layout.
pub const SCHEMA_VERSION: u32 = 1;

const KV_ENTRIES_SQL: &str = include_str!("kv_entries.sql");
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub(super) fn open_file(path: &Path) -> StorageResult<Connection> {
    connect("file", || Connection::open(path))
}

pub(super) fn open_in_memory() -> StorageResult<Connection> {
    connect("memory", Connection::open_in_memory)
}

fn connect(
    mode: &str,
    open: impl FnOnce() -> rusqlite::Result<Connection>,
) -> StorageResult<Connection> {
    let started_at = Instant::now();
    let result = open().map_err(StorageError::from).and_then(|mut conn| {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        ensure_schema(&mut conn)?;
        Ok(conn)
    });

    match &result {
        Ok(_) => info!(
            "event=kv_open module=storage status=ok mode={mode} duration_ms={}",
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=kv_open module=storage status=error mode={mode} duration_ms={} error={err}",
            started_at.elapsed().as_millis()
        ),
    }
    result
}

fn ensure_schema(conn: &mut Connection) -> StorageResult<()> {
    let found: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if found > SCHEMA_VERSION {
        return Err(StorageError::UnsupportedSchemaVersion {
            found,
            supported: SCHEMA_VERSION,
        });
    }
    if found == SCHEMA_VERSION {
        return Ok(());
    }

    let tx = conn.transaction()?;
    tx.execute_batch(KV_ENTRIES_SQL)?;
    tx.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION};"))?;
    tx.commit()?;
    info!("event=kv_schema module=storage status=ok from={found} to={SCHEMA_VERSION}");
    Ok(())
}
