//! Quote domain model.
//!
//! # Responsibility
//! - Define the in-memory `Quote` record and its `(text, category)` key.
//! - Define `QuoteRecord`, the JSON shape used by storage, import and export.
//! - Own the fixed default collection.
//!
//! # Invariants
//! - `text` is trimmed and non-empty.
//! - `category` is trimmed; blank input is coerced to [`DEFAULT_CATEGORY`].
//! - `id` is process-local and never serialized.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Label applied when a quote arrives without a usable category.
pub const DEFAULT_CATEGORY: &str = "Uncategorized";

/// Generated identifier for a quote held in one collection.
pub type QuoteId = Uuid;

const DEFAULT_QUOTES: &[(&str, &str)] = &[
    (
        "The only limit to our realization of tomorrow is our doubts of today.",
        "Inspiration",
    ),
    ("Do one thing every day that scares you.", "Courage"),
    (
        "Happiness is not something ready-made. It comes from your own actions.",
        "Happiness",
    ),
    ("Simplicity is the ultimate sophistication.", "Philosophy"),
    ("You miss 100% of the shots you don't take.", "Motivation"),
];

/// Validation errors for quote input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuoteValidationError {
    /// Text is empty after trimming.
    EmptyText,
}

impl Display for QuoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText => write!(f, "quote text cannot be empty"),
        }
    }
}

impl Error for QuoteValidationError {}

/// Value identity of a quote: the `(text, category)` pair.
///
/// Lookups by key resolve to the first matching quote in collection order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QuoteKey {
    pub text: String,
    pub category: String,
}

impl QuoteKey {
    /// Builds a key using the same normalization as quote construction.
    pub fn new(text: impl AsRef<str>, category: impl AsRef<str>) -> Self {
        Self {
            text: text.as_ref().trim().to_string(),
            category: normalize_category(category.as_ref()),
        }
    }
}

impl Display for QuoteKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // Text is user content; only its length is shown.
        write!(
            f,
            "(text_len={}, category={})",
            self.text.chars().count(),
            self.category
        )
    }
}

/// Persisted and exchanged quote shape: `{ "text": ..., "category": ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRecord {
    pub text: String,
    #[serde(default = "default_category")]
    pub category: String,
}

impl QuoteRecord {
    pub fn new(text: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            category: category.into(),
        }
    }
}

impl From<&Quote> for QuoteRecord {
    fn from(value: &Quote) -> Self {
        Self {
            text: value.text.clone(),
            category: value.category.clone(),
        }
    }
}

/// Canonical in-memory quote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    /// Generated when the quote enters a collection.
    pub id: QuoteId,
    pub text: String,
    pub category: String,
}

impl Quote {
    /// Creates a validated quote with a generated id.
    ///
    /// # Errors
    /// - Returns `EmptyText` when `text` is blank after trimming.
    pub fn new(
        text: impl AsRef<str>,
        category: impl AsRef<str>,
    ) -> Result<Self, QuoteValidationError> {
        let text = text.as_ref().trim();
        if text.is_empty() {
            return Err(QuoteValidationError::EmptyText);
        }
        Ok(Self {
            id: Uuid::new_v4(),
            text: text.to_string(),
            category: normalize_category(category.as_ref()),
        })
    }

    /// Returns the value identity used by key-based lookups.
    pub fn key(&self) -> QuoteKey {
        QuoteKey {
            text: self.text.clone(),
            category: self.category.clone(),
        }
    }

    pub fn matches(&self, key: &QuoteKey) -> bool {
        self.text == key.text && self.category == key.category
    }

    /// Overwrites text/category in place; blank replacements keep the prior value.
    pub fn apply_edit(&mut self, new_text: &str, new_category: &str) {
        let text = new_text.trim();
        if !text.is_empty() {
            self.text = text.to_string();
        }
        let category = new_category.trim();
        if !category.is_empty() {
            self.category = category.to_string();
        }
    }

    pub fn to_record(&self) -> QuoteRecord {
        QuoteRecord::from(self)
    }
}

impl TryFrom<QuoteRecord> for Quote {
    type Error = QuoteValidationError;

    fn try_from(value: QuoteRecord) -> Result<Self, Self::Error> {
        Quote::new(value.text, value.category)
    }
}

/// Returns a fresh copy of the fixed default collection.
pub fn default_quotes() -> Vec<Quote> {
    DEFAULT_QUOTES
        .iter()
        .map(|(text, category)| Quote {
            id: Uuid::new_v4(),
            text: (*text).to_string(),
            category: (*category).to_string(),
        })
        .collect()
}

/// Trims a category and coerces blank input to [`DEFAULT_CATEGORY`].
pub fn normalize_category(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        DEFAULT_CATEGORY.to_string()
    } else {
        trimmed.to_string()
    }
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

#[cfg(test)]
mod tests {
    use super::{default_quotes, Quote, QuoteKey, QuoteRecord, QuoteValidationError};

    #[test]
    fn new_trims_and_defaults_category() {
        let quote = Quote::new("  stay hungry  ", "   ").unwrap();
        assert_eq!(quote.text, "stay hungry");
        assert_eq!(quote.category, "Uncategorized");
    }

    #[test]
    fn new_rejects_blank_text() {
        let err = Quote::new(" \t ", "Any").unwrap_err();
        assert_eq!(err, QuoteValidationError::EmptyText);
    }

    #[test]
    fn apply_edit_keeps_prior_values_for_blank_input() {
        let mut quote = Quote::new("before", "Old").unwrap();
        quote.apply_edit("", "New");
        assert_eq!(quote.text, "before");
        assert_eq!(quote.category, "New");

        quote.apply_edit("after", "  ");
        assert_eq!(quote.text, "after");
        assert_eq!(quote.category, "New");
    }

    #[test]
    fn record_without_category_deserializes_with_default() {
        let record: QuoteRecord = serde_json::from_str(r#"{"text":"x"}"#).unwrap();
        assert_eq!(record, QuoteRecord::new("x", "Uncategorized"));
    }

    #[test]
    fn key_display_does_not_leak_text() {
        let key = QuoteKey::new("secret words", "C1");
        let rendered = key.to_string();
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("C1"));
    }

    #[test]
    fn default_quotes_have_distinct_ids() {
        let quotes = default_quotes();
        assert_eq!(quotes.len(), 5);
        assert_ne!(quotes[0].id, quotes[1].id);
    }
}
