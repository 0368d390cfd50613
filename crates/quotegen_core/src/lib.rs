//! Core domain logic for quotegen.
//! This crate is the single source of truth for quote invariants.

pub mod config;
pub mod logging;
pub mod model;
pub mod selector;
pub mod service;
pub mod storage;
pub mod store;
pub mod sync;
pub mod transfer;

pub use config::{ConfigError, QuoteConfig, SyncSettings};
pub use logging::{default_log_level, init_logging, logging_status, LoggingStatus};
pub use model::quote::{
    default_quotes, Quote, QuoteId, QuoteKey, QuoteRecord, QuoteValidationError, DEFAULT_CATEGORY,
};
pub use selector::{Pick, PresentationSelector};
pub use service::quote_service::{QuoteService, Refreshed, ServiceError, ServiceResult};
pub use storage::{
    KeyValueStore, MemoryKvStore, SqliteKvStore, StorageError, StorageScope, SCHEMA_VERSION,
};
pub use store::category_index::{CategoryFilter, CategoryIndex, ALL_CATEGORIES};
pub use store::quote_store::{QuoteStore, StoreError, StoreResult};
pub use sync::{
    DedupeKey, HttpRemoteSource, RemoteSource, SharedStore, SyncError, SyncOutcome,
    SyncScheduler, SyncStatus,
};
pub use transfer::{export_file_name, export_json, parse_import, ImportBatch, ImportError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
