//! Quote use-case service.
//!
//! # Responsibility
//! - Run the mutation → index rebuild → selection refresh → persistence flow.
//! - Own the selected-category preference in durable storage.
//! - Expose import/export over the JSON document format.
//!
//! # Invariants
//! - After startup and after every mutation, the selected filter names an
//!   existing category or is `All`. A filter chosen explicitly is kept as
//!   given, even when it matches nothing.
//! - The preference is stored as the JSON form of [`CategoryFilter`].
//! - The store lock is held only for the duration of one call.

use crate::model::quote::{Quote, QuoteKey, QuoteRecord};
use crate::selector::{Pick, PresentationSelector};
use crate::storage::{KeyValueStore, StorageError, SELECTED_CATEGORY_KEY};
use crate::store::category_index::CategoryFilter;
use crate::store::quote_store::{QuoteStore, StoreError};
use crate::sync::scheduler::SharedStore;
use crate::transfer::{parse_import, read_import, write_export, ImportBatch, ImportError};
use chrono::Utc;
use log::{info, warn};
use rand::Rng;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::sync::{Arc, MutexGuard};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for quote use-cases.
#[derive(Debug)]
pub enum ServiceError {
    Store(StoreError),
    Storage(StorageError),
    Import(ImportError),
    /// Shared store lock was poisoned by a panicking writer.
    Poisoned,
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "{err}"),
            Self::Import(err) => write!(f, "{err}"),
            Self::Poisoned => write!(f, "quote store lock poisoned"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::Import(err) => Some(err),
            Self::Poisoned => None,
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<StorageError> for ServiceError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl From<ImportError> for ServiceError {
    fn from(value: ImportError) -> Self {
        Self::Import(value)
    }
}

/// Result of a mutation paired with the refreshed selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Refreshed<T> {
    pub value: T,
    pub pick: Pick,
}

/// Quote service facade over a shared store and a selector.
pub struct QuoteService<S, T, R>
where
    S: KeyValueStore,
    T: KeyValueStore,
    R: Rng,
{
    store: SharedStore<S>,
    selector: PresentationSelector<T, R>,
    filter: CategoryFilter,
}

impl<S, T, R> QuoteService<S, T, R>
where
    S: KeyValueStore,
    T: KeyValueStore,
    R: Rng,
{
    /// Creates a service and restores the persisted category preference.
    pub fn new(store: SharedStore<S>, selector: PresentationSelector<T, R>) -> ServiceResult<Self> {
        let filter = {
            let guard = store.lock().map_err(|_| ServiceError::Poisoned)?;
            let stored = load_preference(guard.storage());
            reconcile_filter(&*guard, &stored)?
        };
        Ok(Self {
            store,
            selector,
            filter,
        })
    }

    pub fn shared_store(&self) -> SharedStore<S> {
        Arc::clone(&self.store)
    }

    pub fn selected_category(&self) -> &CategoryFilter {
        &self.filter
    }

    /// Filter options in display order, sentinel first.
    pub fn category_filters(&self) -> ServiceResult<Vec<CategoryFilter>> {
        Ok(self.lock()?.categories().filters())
    }

    pub fn quotes(&self) -> ServiceResult<Vec<Quote>> {
        Ok(self.lock()?.quotes().to_vec())
    }

    /// Persists a new category preference and shows a quote from it.
    pub fn select_category(&mut self, filter: CategoryFilter) -> ServiceResult<Pick> {
        let json = serde_json::to_string(&filter).map_err(StorageError::from)?;
        self.lock()?.storage().set(SELECTED_CATEGORY_KEY, &json)?;
        info!("event=category_select module=service status=ok filter={filter}");
        self.filter = filter;
        self.show_random()
    }

    /// Picks a random quote under the current filter.
    pub fn show_random(&mut self) -> ServiceResult<Pick> {
        let store = self
            .store
            .lock()
            .map_err(|_| ServiceError::Poisoned)?;
        Ok(self.selector.pick(store.quotes(), &self.filter))
    }

    /// Shows the session's last-viewed quote, or a fresh pick when none survives.
    pub fn restore_or_pick(&mut self) -> ServiceResult<Pick> {
        let restored = {
            let store = self.lock()?;
            self.selector.restore_last_viewed(store.quotes())
        };
        match restored {
            Some(quote) => Ok(Pick::Shown(quote)),
            None => self.show_random(),
        }
    }

    pub fn add_quote(&mut self, text: &str, category: &str) -> ServiceResult<Refreshed<Quote>> {
        let quote = self.mutate(|store| store.add(text, category))?;
        self.refreshed(quote)
    }

    pub fn edit_quote(
        &mut self,
        key: &QuoteKey,
        new_text: &str,
        new_category: &str,
    ) -> ServiceResult<Refreshed<Quote>> {
        let quote = self.mutate(|store| store.edit(key, new_text, new_category))?;
        self.refreshed(quote)
    }

    pub fn delete_quote(&mut self, key: &QuoteKey) -> ServiceResult<Refreshed<Quote>> {
        let quote = self.mutate(|store| store.delete(key))?;
        self.refreshed(quote)
    }

    /// Snapshot of the collection for export.
    pub fn export_records(&self) -> ServiceResult<Vec<QuoteRecord>> {
        Ok(self.lock()?.export_all())
    }

    /// Writes a timestamped export document into `dir`.
    pub fn export_to_dir(&self, dir: &Path) -> ServiceResult<PathBuf> {
        let records = self.export_records()?;
        Ok(write_export(dir, &records, Utc::now())?)
    }

    /// Imports a JSON document; returns the number of quotes added.
    ///
    /// # Errors
    /// - `Import` when the document is malformed or not a list; nothing is added.
    pub fn import_json(&mut self, json: &str) -> ServiceResult<Refreshed<usize>> {
        let batch = parse_import(json)?;
        self.import_batch(batch)
    }

    /// Reads an export document from `path` and imports it.
    pub fn import_file(&mut self, path: &Path) -> ServiceResult<Refreshed<usize>> {
        let batch = read_import(path)?;
        self.import_batch(batch)
    }

    fn import_batch(&mut self, batch: ImportBatch) -> ServiceResult<Refreshed<usize>> {
        let added = self.mutate(|store| store.import_merge(batch.records))?;
        info!(
            "event=import module=service status=ok added={added} dropped={}",
            batch.dropped
        );
        self.refreshed(added)
    }

    /// Resets quotes to defaults and forgets preference and last-viewed state.
    pub fn clear_storage(&mut self) -> ServiceResult<Refreshed<()>> {
        self.mutate(|store| store.clear())?;
        {
            let store = self.lock()?;
            store.storage().remove(SELECTED_CATEGORY_KEY)?;
        }
        self.filter = CategoryFilter::All;
        self.selector.forget_last_viewed();
        self.refreshed(())
    }

    fn mutate<V>(
        &mut self,
        op: impl FnOnce(&mut QuoteStore<S>) -> Result<V, StoreError>,
    ) -> ServiceResult<V> {
        let mut store = self.lock()?;
        let value = op(&mut *store)?;
        let filter = reconcile_filter(&*store, &self.filter)?;
        drop(store);
        self.filter = filter;
        Ok(value)
    }

    fn refreshed<V>(&mut self, value: V) -> ServiceResult<Refreshed<V>> {
        let pick = self.show_random()?;
        Ok(Refreshed { value, pick })
    }

    fn lock(&self) -> ServiceResult<MutexGuard<'_, QuoteStore<S>>> {
        self.store.lock().map_err(|_| ServiceError::Poisoned)
    }
}

/// Reads the stored preference; missing or unreadable values mean `All`.
fn load_preference<S: KeyValueStore>(storage: &S) -> CategoryFilter {
    let raw = match storage.get(SELECTED_CATEGORY_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return CategoryFilter::All,
        Err(err) => {
            warn!("event=preference_load module=service status=error error={err}");
            return CategoryFilter::All;
        }
    };
    serde_json::from_str(&raw).unwrap_or_else(|err| {
        warn!("event=preference_load module=service status=invalid error={err}");
        CategoryFilter::All
    })
}

/// Falls back to `All` when the filtered category no longer exists.
fn reconcile_filter<S: KeyValueStore>(
    store: &QuoteStore<S>,
    filter: &CategoryFilter,
) -> ServiceResult<CategoryFilter> {
    match filter {
        CategoryFilter::Named(category) if !store.categories().contains(category) => {
            info!("event=category_reset module=service status=ok reason=category_removed");
            store.storage().remove(SELECTED_CATEGORY_KEY)?;
            Ok(CategoryFilter::All)
        }
        other => Ok(other.clone()),
    }
}
