//! Append-only merge of incoming quotes into a local collection.
//!
//! # Invariants
//! - Local quotes are never removed or overwritten.
//! - Incoming order is preserved for accepted entries.
//! - An incoming entry is accepted at most once per merge, even if the
//!   batch itself carries duplicates under the active key.

use crate::model::quote::{Quote, QuoteRecord};
use log::debug;
use std::collections::HashSet;

/// Equality rule deciding whether an incoming quote already exists locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupeKey {
    /// Same text and same category. Used by file import.
    TextAndCategory,
    /// Same text regardless of category. Used by remote sync.
    TextOnly,
}

impl DedupeKey {
    fn key_of(self, text: &str, category: &str) -> (String, Option<String>) {
        match self {
            Self::TextAndCategory => (text.to_string(), Some(category.to_string())),
            Self::TextOnly => (text.to_string(), None),
        }
    }
}

/// Returns the incoming quotes that should be appended to `local`.
///
/// Records that fail quote validation (blank text) are dropped.
pub fn merge(incoming: Vec<QuoteRecord>, local: &[Quote], key: DedupeKey) -> Vec<Quote> {
    let mut seen: HashSet<(String, Option<String>)> = local
        .iter()
        .map(|quote| key.key_of(&quote.text, &quote.category))
        .collect();

    let offered = incoming.len();
    let accepted: Vec<Quote> = incoming
        .into_iter()
        .filter_map(|record| Quote::try_from(record).ok())
        .filter(|quote| seen.insert(key.key_of(&quote.text, &quote.category)))
        .collect();

    debug!(
        "event=merge module=sync status=ok key={:?} offered={} accepted={}",
        key,
        offered,
        accepted.len()
    );
    accepted
}
