//! Quote collection with write-through persistence.
//!
//! # Responsibility
//! - Load the collection from durable storage, falling back to defaults.
//! - Provide add/edit/delete/import/merge/clear over the ordered collection.
//! - Mirror every mutation to storage as a whole-collection overwrite.
//!
//! # Invariants
//! - `load` never fails: invalid content yields the default list.
//! - A failed storage write restores the previous in-memory state.
//! - Key-based lookups resolve to the first match in collection order.

use crate::model::quote::{
    default_quotes, Quote, QuoteId, QuoteKey, QuoteRecord, QuoteValidationError,
};
use crate::storage::{KeyValueStore, StorageError, QUOTES_KEY};
use crate::store::category_index::CategoryIndex;
use crate::sync::merge::{merge, DedupeKey};
use crate::transfer::record_from_value;
use log::{error, info, warn};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors returned by quote store mutations.
#[derive(Debug)]
pub enum StoreError {
    Validation(QuoteValidationError),
    NotFound(QuoteKey),
    IdNotFound(QuoteId),
    Storage(StorageError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(key) => write!(f, "quote not found: {key}"),
            Self::IdNotFound(id) => write!(f, "quote not found: {id}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::NotFound(_) | Self::IdNotFound(_) => None,
        }
    }
}

impl From<QuoteValidationError> for StoreError {
    fn from(value: QuoteValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StorageError> for StoreError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

/// Ordered quote collection mirrored to a [`KeyValueStore`].
pub struct QuoteStore<S: KeyValueStore> {
    storage: S,
    quotes: Vec<Quote>,
    categories: CategoryIndex,
}

impl<S: KeyValueStore> QuoteStore<S> {
    /// Loads the persisted collection, or the default list when it is
    /// missing or invalid.
    pub fn load(storage: S) -> Self {
        let quotes = match storage.get(QUOTES_KEY) {
            Ok(Some(json)) => match parse_collection(&json) {
                Some(quotes) => {
                    info!(
                        "event=store_load module=store status=ok source=storage count={}",
                        quotes.len()
                    );
                    quotes
                }
                None => {
                    warn!("event=store_load module=store status=fallback reason=invalid_content");
                    default_quotes()
                }
            },
            Ok(None) => {
                info!("event=store_load module=store status=fallback reason=missing");
                default_quotes()
            }
            Err(err) => {
                error!(
                    "event=store_load module=store status=fallback reason=storage_error error={err}"
                );
                default_quotes()
            }
        };

        let categories = CategoryIndex::rebuild(&quotes);
        Self {
            storage,
            quotes,
            categories,
        }
    }

    pub fn quotes(&self) -> &[Quote] {
        &self.quotes
    }

    pub fn categories(&self) -> &CategoryIndex {
        &self.categories
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// First quote matching `key`.
    pub fn find(&self, key: &QuoteKey) -> Option<&Quote> {
        self.quotes.iter().find(|quote| quote.matches(key))
    }

    pub fn get(&self, id: QuoteId) -> Option<&Quote> {
        self.quotes.iter().find(|quote| quote.id == id)
    }

    /// Appends a new quote.
    ///
    /// # Errors
    /// - `Validation` when `text` is blank; the collection is unchanged.
    /// - `Storage` when the write fails; the append is rolled back.
    pub fn add(&mut self, text: &str, category: &str) -> StoreResult<Quote> {
        let quote = Quote::new(text, category)?;
        let previous = self.quotes.clone();
        self.quotes.push(quote.clone());
        self.commit("add", previous)?;
        Ok(quote)
    }

    /// Edits the first quote matching `key`; blank replacements keep prior values.
    pub fn edit(&mut self, key: &QuoteKey, new_text: &str, new_category: &str) -> StoreResult<Quote> {
        let index = self
            .position_by_key(key)
            .ok_or_else(|| StoreError::NotFound(key.clone()))?;
        self.edit_at(index, new_text, new_category)
    }

    pub fn edit_by_id(&mut self, id: QuoteId, new_text: &str, new_category: &str) -> StoreResult<Quote> {
        let index = self.position_by_id(id).ok_or(StoreError::IdNotFound(id))?;
        self.edit_at(index, new_text, new_category)
    }

    /// Removes the first quote matching `key`.
    pub fn delete(&mut self, key: &QuoteKey) -> StoreResult<Quote> {
        let index = self
            .position_by_key(key)
            .ok_or_else(|| StoreError::NotFound(key.clone()))?;
        self.delete_at(index)
    }

    pub fn delete_by_id(&mut self, id: QuoteId) -> StoreResult<Quote> {
        let index = self.position_by_id(id).ok_or(StoreError::IdNotFound(id))?;
        self.delete_at(index)
    }

    /// Snapshot of the whole collection in its exchange shape.
    pub fn export_all(&self) -> Vec<QuoteRecord> {
        self.quotes.iter().map(Quote::to_record).collect()
    }

    /// Appends candidates absent by `(text, category)`; returns the count added.
    pub fn import_merge(&mut self, candidates: Vec<QuoteRecord>) -> StoreResult<usize> {
        self.append_merged("import", candidates, DedupeKey::TextAndCategory)
    }

    /// Appends remote quotes whose text is absent locally; returns the count added.
    pub fn merge_remote(&mut self, remote: Vec<QuoteRecord>) -> StoreResult<usize> {
        self.append_merged("merge_remote", remote, DedupeKey::TextOnly)
    }

    /// Resets the collection to the default list.
    pub fn clear(&mut self) -> StoreResult<()> {
        let previous = std::mem::replace(&mut self.quotes, default_quotes());
        self.commit("clear", previous)
    }

    fn append_merged(
        &mut self,
        op: &str,
        incoming: Vec<QuoteRecord>,
        key: DedupeKey,
    ) -> StoreResult<usize> {
        let accepted = merge(incoming, &self.quotes, key);
        let added = accepted.len();
        if added == 0 {
            info!("event=store_{op} module=store status=ok added=0");
            return Ok(0);
        }

        let previous = self.quotes.clone();
        self.quotes.extend(accepted);
        self.commit(op, previous)?;
        Ok(added)
    }

    fn edit_at(&mut self, index: usize, new_text: &str, new_category: &str) -> StoreResult<Quote> {
        let previous = self.quotes.clone();
        self.quotes[index].apply_edit(new_text, new_category);
        let edited = self.quotes[index].clone();
        self.commit("edit", previous)?;
        Ok(edited)
    }

    fn delete_at(&mut self, index: usize) -> StoreResult<Quote> {
        let previous = self.quotes.clone();
        let removed = self.quotes.remove(index);
        self.commit("delete", previous)?;
        Ok(removed)
    }

    fn position_by_key(&self, key: &QuoteKey) -> Option<usize> {
        self.quotes.iter().position(|quote| quote.matches(key))
    }

    fn position_by_id(&self, id: QuoteId) -> Option<usize> {
        self.quotes.iter().position(|quote| quote.id == id)
    }

    /// Rebuilds the index and persists; restores `previous` on write failure.
    fn commit(&mut self, op: &str, previous: Vec<Quote>) -> StoreResult<()> {
        match self.persist() {
            Ok(()) => {
                self.categories = CategoryIndex::rebuild(&self.quotes);
                info!(
                    "event=store_{op} module=store status=ok count={} categories={}",
                    self.quotes.len(),
                    self.categories.len()
                );
                Ok(())
            }
            Err(err) => {
                self.quotes = previous;
                error!("event=store_{op} module=store status=error error={err}");
                Err(err.into())
            }
        }
    }

    fn persist(&self) -> Result<(), StorageError> {
        let json = serde_json::to_string(&self.export_all())?;
        self.storage.set(QUOTES_KEY, &json)
    }
}

/// Parses a persisted collection; `None` when any element is invalid.
fn parse_collection(json: &str) -> Option<Vec<Quote>> {
    let value: Value = serde_json::from_str(json).ok()?;
    value
        .as_array()?
        .iter()
        .map(|item| record_from_value(item).and_then(|record| Quote::try_from(record).ok()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{parse_collection, QuoteStore, StoreError};
    use crate::model::quote::QuoteKey;
    use crate::storage::{KeyValueStore, MemoryKvStore, StorageError, StorageResult};

    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> StorageResult<Option<String>> {
            Ok(None)
        }

        fn set(&self, _key: &str, _value: &str) -> StorageResult<()> {
            Err(StorageError::Poisoned)
        }

        fn remove(&self, _key: &str) -> StorageResult<()> {
            Err(StorageError::Poisoned)
        }
    }

    #[test]
    fn parse_collection_rejects_any_invalid_element() {
        assert!(parse_collection(r#"[{"text":"a"},{"category":"b"}]"#).is_none());
        assert!(parse_collection(r#"{"text":"a"}"#).is_none());
        assert_eq!(parse_collection("[]").unwrap().len(), 0);
    }

    #[test]
    fn failed_write_rolls_back_mutation() {
        let mut store = QuoteStore::load(ReadOnlyStore);
        let before = store.export_all();

        let err = store.add("new", "C").unwrap_err();
        assert!(matches!(err, StoreError::Storage(_)));
        assert_eq!(store.export_all(), before);

        let key = QuoteKey::new("Do one thing every day that scares you.", "Courage");
        store.delete(&key).unwrap_err();
        assert!(store.find(&key).is_some());
        assert!(store.categories().contains("Courage"));
    }

    #[test]
    fn edit_by_id_targets_exact_duplicate() {
        let mut store = QuoteStore::load(MemoryKvStore::new());
        let first = store.add("twin", "C").unwrap();
        let second = store.add("twin", "C").unwrap();

        store.edit_by_id(second.id, "changed", "").unwrap();

        assert_eq!(store.get(first.id).unwrap().text, "twin");
        assert_eq!(store.get(second.id).unwrap().text, "changed");
    }

    #[test]
    fn delete_by_id_removes_only_that_duplicate() {
        let mut store = QuoteStore::load(MemoryKvStore::new());
        let first = store.add("twin", "C").unwrap();
        let second = store.add("twin", "C").unwrap();
        let before = store.len();

        let removed = store.delete_by_id(second.id).unwrap();

        assert_eq!(removed.id, second.id);
        assert_eq!(store.len(), before - 1);
        assert!(store.get(first.id).is_some());
        assert!(store.get(second.id).is_none());
        assert!(matches!(
            store.delete_by_id(second.id),
            Err(StoreError::IdNotFound(id)) if id == second.id
        ));
    }
}
