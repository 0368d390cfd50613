use quotegen_core::{
    CategoryFilter, MemoryKvStore, Pick, PresentationSelector, Quote, QuoteStore,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;

fn seeded() -> PresentationSelector<MemoryKvStore, StdRng> {
    PresentationSelector::with_rng(MemoryKvStore::new(), StdRng::seed_from_u64(42))
}

#[test]
fn pick_on_empty_pool_returns_empty_variant() {
    let mut selector = seeded();

    assert_eq!(
        selector.pick(&[], &CategoryFilter::All),
        Pick::Empty {
            filter: CategoryFilter::All
        }
    );

    let named = CategoryFilter::Named("Nothing".to_string());
    let quotes = vec![Quote::new("a", "Other").unwrap()];
    assert_eq!(
        selector.pick(&quotes, &named),
        Pick::Empty { filter: named }
    );
}

#[test]
fn pick_visits_every_element_of_the_pool() {
    let mut selector = seeded();
    let quotes: Vec<Quote> = (0..6)
        .map(|i| Quote::new(format!("quote {i}"), "C").unwrap())
        .collect();

    let mut seen = HashSet::new();
    for _ in 0..600 {
        let pick = selector.pick(&quotes, &CategoryFilter::All);
        seen.insert(pick.quote().unwrap().id);
    }

    assert_eq!(seen.len(), quotes.len());
}

#[test]
fn pick_respects_category_filter() {
    let mut selector = seeded();
    let quotes = vec![
        Quote::new("a", "X").unwrap(),
        Quote::new("b", "Y").unwrap(),
        Quote::new("c", "X").unwrap(),
    ];
    let filter = CategoryFilter::Named("X".to_string());

    for _ in 0..100 {
        let pick = selector.pick(&quotes, &filter);
        assert_eq!(pick.quote().unwrap().category, "X");
    }
}

#[test]
fn filtered_pick_after_adds_returns_only_that_category() {
    let mut store = QuoteStore::load(MemoryKvStore::new());
    store.add("A", "C1").unwrap();
    store.add("B", "C1").unwrap();
    let mut selector = seeded();
    let filter = CategoryFilter::Named("C1".to_string());

    for _ in 0..50 {
        let pick = selector.pick(store.quotes(), &filter);
        let text = &pick.quote().unwrap().text;
        assert!(text == "A" || text == "B", "unexpected pick {text}");
    }
}

#[test]
fn restore_last_viewed_returns_previous_pick() {
    let mut selector = seeded();
    let quotes = vec![Quote::new("a", "X").unwrap(), Quote::new("b", "Y").unwrap()];

    assert!(selector.restore_last_viewed(&quotes).is_none());

    let shown = selector.pick(&quotes, &CategoryFilter::All);
    let restored = selector.restore_last_viewed(&quotes).unwrap();
    assert_eq!(Some(&restored), shown.quote());
}

#[test]
fn restore_last_viewed_ignores_quotes_no_longer_present() {
    let mut selector = seeded();
    let quotes = vec![Quote::new("gone soon", "X").unwrap()];
    selector.pick(&quotes, &CategoryFilter::All);

    let remaining = vec![Quote::new("other", "X").unwrap()];
    assert!(selector.restore_last_viewed(&remaining).is_none());
}
