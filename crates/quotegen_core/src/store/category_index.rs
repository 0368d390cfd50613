//! Derived set of distinct categories for filter controls.

use crate::model::quote::{normalize_category, Quote};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

/// Display label of the "no restriction" sentinel.
pub const ALL_CATEGORIES: &str = "all";

/// Category restriction applied when picking a quote.
///
/// Serialized as `null` for [`CategoryFilter::All`] and as the plain name
/// otherwise, so a category literally called `all` stays distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum CategoryFilter {
    /// Sentinel meaning every category.
    #[default]
    All,
    Named(String),
}

impl CategoryFilter {
    /// Restricts picks to one category, normalized like quote input.
    pub fn named(category: impl AsRef<str>) -> Self {
        Self::Named(normalize_category(category.as_ref()))
    }

    pub fn allows(&self, quote: &Quote) -> bool {
        match self {
            Self::All => true,
            Self::Named(category) => quote.category == *category,
        }
    }
}

impl Display for CategoryFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "{ALL_CATEGORIES}"),
            Self::Named(category) => write!(f, "{category}"),
        }
    }
}

impl From<Option<String>> for CategoryFilter {
    fn from(value: Option<String>) -> Self {
        value.map_or(Self::All, Self::named)
    }
}

impl From<CategoryFilter> for Option<String> {
    fn from(value: CategoryFilter) -> Self {
        match value {
            CategoryFilter::All => None,
            CategoryFilter::Named(category) => Some(category),
        }
    }
}

/// Sorted distinct categories of one collection snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryIndex {
    categories: BTreeSet<String>,
}

impl CategoryIndex {
    /// Recomputes the index from scratch.
    pub fn rebuild(quotes: &[Quote]) -> Self {
        Self {
            categories: quotes.iter().map(|quote| quote.category.clone()).collect(),
        }
    }

    /// Filter options in display order: the sentinel first, then names.
    pub fn filters(&self) -> Vec<CategoryFilter> {
        std::iter::once(CategoryFilter::All)
            .chain(self.categories.iter().cloned().map(CategoryFilter::Named))
            .collect()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(String::as_str)
    }

    pub fn contains(&self, category: &str) -> bool {
        self.categories.contains(category)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{CategoryFilter, CategoryIndex};
    use crate::model::quote::Quote;

    #[test]
    fn rebuild_sorts_and_dedupes_with_sentinel_first() {
        let quotes = vec![
            Quote::new("a", "Zen").unwrap(),
            Quote::new("b", "Art").unwrap(),
            Quote::new("c", "Zen").unwrap(),
        ];
        let index = CategoryIndex::rebuild(&quotes);

        assert_eq!(index.len(), 2);
        assert_eq!(
            index.filters(),
            vec![
                CategoryFilter::All,
                CategoryFilter::Named("Art".to_string()),
                CategoryFilter::Named("Zen".to_string()),
            ]
        );
    }

    #[test]
    fn empty_collection_still_offers_sentinel() {
        let index = CategoryIndex::rebuild(&[]);
        assert!(index.is_empty());
        assert_eq!(index.filters(), vec![CategoryFilter::All]);
    }

    #[test]
    fn named_normalizes_like_quote_input() {
        assert_eq!(CategoryFilter::named(" Zen "), CategoryFilter::Named("Zen".to_string()));
        assert_eq!(
            CategoryFilter::named("  "),
            CategoryFilter::Named("Uncategorized".to_string())
        );
    }

    #[test]
    fn sentinel_serializes_as_null_and_names_as_strings() {
        assert_eq!(serde_json::to_string(&CategoryFilter::All).unwrap(), "null");
        let parsed: CategoryFilter = serde_json::from_str("null").unwrap();
        assert_eq!(parsed, CategoryFilter::All);
        let parsed: CategoryFilter = serde_json::from_str("\"Courage\"").unwrap();
        assert_eq!(parsed, CategoryFilter::Named("Courage".to_string()));
    }

    #[test]
    fn category_named_all_round_trips_as_named() {
        let quotes = vec![Quote::new("a", "all").unwrap(), Quote::new("b", "Zen").unwrap()];
        let index = CategoryIndex::rebuild(&quotes);
        let named_all = CategoryFilter::Named("all".to_string());
        assert!(index.filters().contains(&named_all));

        let json = serde_json::to_string(&named_all).unwrap();
        let parsed: CategoryFilter = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, named_all);
        assert_ne!(parsed, CategoryFilter::All);
        assert!(parsed.allows(&quotes[0]));
        assert!(!parsed.allows(&quotes[1]));
    }
}
