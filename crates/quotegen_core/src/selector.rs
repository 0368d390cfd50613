//! Random quote selection with session-scoped last-viewed memory.
//!
//! # Responsibility
//! - Draw a uniformly random quote from the pool matching a category filter.
//! - Remember the last shown quote in session storage and restore it.
//!
//! # Invariants
//! - `pick` never fails; an empty pool is an explicit result.
//! - An empty pool clears the last-viewed record.
//! - Session storage failures are logged and never surface to callers.

use crate::model::quote::{Quote, QuoteKey, QuoteRecord};
use crate::storage::{KeyValueStore, StorageError, LAST_VIEWED_KEY};
use crate::store::category_index::CategoryFilter;
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Outcome of one selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pick {
    Shown(Quote),
    /// No quote matches `filter`.
    Empty { filter: CategoryFilter },
}

impl Pick {
    pub fn quote(&self) -> Option<&Quote> {
        match self {
            Self::Shown(quote) => Some(quote),
            Self::Empty { .. } => None,
        }
    }
}

/// Picks quotes and tracks the last-viewed record.
pub struct PresentationSelector<S: KeyValueStore, R: Rng = StdRng> {
    session: S,
    rng: R,
}

impl<S: KeyValueStore> PresentationSelector<S, StdRng> {
    /// Creates a selector seeded from OS entropy.
    pub fn new(session: S) -> Self {
        Self::with_rng(session, StdRng::from_entropy())
    }
}

impl<S: KeyValueStore, R: Rng> PresentationSelector<S, R> {
    pub fn with_rng(session: S, rng: R) -> Self {
        Self { session, rng }
    }

    /// Draws one quote from the pool selected by `filter`.
    pub fn pick(&mut self, quotes: &[Quote], filter: &CategoryFilter) -> Pick {
        let pool: Vec<&Quote> = quotes.iter().filter(|quote| filter.allows(quote)).collect();
        if pool.is_empty() {
            debug!("event=pick module=selector status=empty filter={filter}");
            self.forget_last_viewed();
            return Pick::Empty {
                filter: filter.clone(),
            };
        }

        let chosen = pool[self.rng.gen_range(0..pool.len())].clone();
        self.remember(&chosen);
        debug!(
            "event=pick module=selector status=ok filter={filter} pool={}",
            pool.len()
        );
        Pick::Shown(chosen)
    }

    /// Returns the last-viewed quote when it still exists in `quotes`.
    pub fn restore_last_viewed(&self, quotes: &[Quote]) -> Option<Quote> {
        let record = self.last_viewed()?;
        let key = QuoteKey::new(&record.text, &record.category);
        quotes.iter().find(|quote| quote.matches(&key)).cloned()
    }

    pub fn last_viewed(&self) -> Option<QuoteRecord> {
        let json = match self.session.get(LAST_VIEWED_KEY) {
            Ok(value) => value?,
            Err(err) => {
                warn!("event=last_viewed_read module=selector status=error error={err}");
                return None;
            }
        };
        match serde_json::from_str(&json) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!("event=last_viewed_read module=selector status=invalid error={err}");
                None
            }
        }
    }

    /// Drops the last-viewed record.
    pub fn forget_last_viewed(&self) {
        if let Err(err) = self.session.remove(LAST_VIEWED_KEY) {
            warn!("event=last_viewed_clear module=selector status=error error={err}");
        }
    }

    fn remember(&self, quote: &Quote) {
        let result = serde_json::to_string(&quote.to_record())
            .map_err(StorageError::from)
            .and_then(|json| self.session.set(LAST_VIEWED_KEY, &json));
        if let Err(err) = result {
            warn!("event=last_viewed_write module=selector status=error error={err}");
        }
    }
}
