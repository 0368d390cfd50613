//! Key-value persistence contracts and implementations.
//!
//! # Responsibility
//! - Define the string-keyed blob interface every store writes through.
//! - Provide an in-memory backend (session scope, tests) and a SQLite
//!   backend partitioned into durable and session scopes.
//!
//! # Invariants
//! - `set` is a whole-value overwrite; there are no partial writes.
//! - `remove` on a missing key is not an error.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

mod memory;
mod schema;
mod sqlite;

pub use memory::MemoryKvStore;
pub use schema::SCHEMA_VERSION;
pub use sqlite::{SqliteKvStore, StorageScope};

/// Durable storage key holding the serialized quote collection.
pub const QUOTES_KEY: &str = "quotegen.quotes";
/// Durable storage key holding the selected category filter.
pub const SELECTED_CATEGORY_KEY: &str = "quotegen.selected_category";
/// Session storage key holding the last displayed quote.
pub const LAST_VIEWED_KEY: &str = "quotegen.last_viewed";

pub type StorageResult<T> = Result<T, StorageError>;

/// Storage transport and encoding errors.
#[derive(Debug)]
pub enum StorageError {
    Sqlite(rusqlite::Error),
    /// Database was written by a newer binary.
    UnsupportedSchemaVersion { found: u32, supported: u32 },
    /// Backend lock was poisoned by a panicking writer.
    Poisoned,
    Serialize(serde_json::Error),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion { found, supported } => write!(
                f,
                "storage schema version {found} is newer than supported {supported}"
            ),
            Self::Poisoned => write!(f, "storage lock poisoned"),
            Self::Serialize(err) => write!(f, "failed to serialize value: {err}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } | Self::Poisoned => None,
            Self::Serialize(err) => Some(err),
        }
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}

/// String-keyed blob storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
    fn remove(&self, key: &str) -> StorageResult<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        (**self).remove(key)
    }
}
