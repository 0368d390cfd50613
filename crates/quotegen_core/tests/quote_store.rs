use quotegen_core::storage::QUOTES_KEY;
use quotegen_core::{
    default_quotes, KeyValueStore, MemoryKvStore, QuoteKey, QuoteRecord, QuoteStore, StoreError,
};
use std::sync::Arc;

fn fresh_store() -> QuoteStore<Arc<MemoryKvStore>> {
    QuoteStore::load(Arc::new(MemoryKvStore::new()))
}

#[test]
fn load_without_persisted_data_uses_defaults() {
    let store = fresh_store();
    let defaults: Vec<QuoteRecord> = default_quotes().iter().map(QuoteRecord::from).collect();

    assert_eq!(store.export_all(), defaults);
    assert_eq!(store.categories().len(), 5);
}

#[test]
fn load_with_invalid_json_falls_back_to_defaults() {
    let storage = MemoryKvStore::with_entries([(QUOTES_KEY, "not json")]);
    let store = QuoteStore::load(storage);
    assert_eq!(store.len(), default_quotes().len());
}

#[test]
fn load_with_structurally_invalid_list_falls_back_to_defaults() {
    for content in [r#"{"text":"x"}"#, r#"[{"text":"ok"},{"text":3}]"#, r#"["plain"]"#] {
        let store = QuoteStore::load(MemoryKvStore::with_entries([(QUOTES_KEY, content)]));
        assert_eq!(store.len(), 5, "content {content} should fall back");
    }
}

#[test]
fn load_defaults_missing_category() {
    let store = QuoteStore::load(MemoryKvStore::with_entries([(QUOTES_KEY, r#"[{"text":"x"}]"#)]));

    assert_eq!(store.export_all(), vec![QuoteRecord::new("x", "Uncategorized")]);
}

#[test]
fn add_appends_persists_and_is_findable() {
    let storage = Arc::new(MemoryKvStore::new());
    let mut store = QuoteStore::load(Arc::clone(&storage));
    let before = store.len();

    let quote = store.add("Stay curious.", "Learning").unwrap();

    assert_eq!(store.len(), before + 1);
    assert_eq!(store.find(&QuoteKey::new("Stay curious.", "Learning")), Some(&quote));
    assert!(store.categories().contains("Learning"));

    let reloaded = QuoteStore::load(Arc::clone(&storage));
    assert_eq!(reloaded.export_all(), store.export_all());
}

#[test]
fn add_with_blank_text_is_rejected() {
    let mut store = fresh_store();
    let before = store.len();

    let err = store.add("   ", "Any").unwrap_err();

    assert!(matches!(err, StoreError::Validation(_)));
    assert_eq!(store.len(), before);
}

#[test]
fn add_with_blank_category_uses_default_label() {
    let mut store = fresh_store();
    let quote = store.add("text", "").unwrap();
    assert_eq!(quote.category, "Uncategorized");
    assert!(store.categories().contains("Uncategorized"));
}

#[test]
fn edit_overwrites_first_match_and_ignores_blank_values() {
    let mut store = fresh_store();
    store.add("dup", "C").unwrap();
    store.add("dup", "C").unwrap();
    let key = QuoteKey::new("dup", "C");

    let edited = store.edit(&key, "", "D").unwrap();

    assert_eq!(edited.text, "dup");
    assert_eq!(edited.category, "D");
    let remaining: Vec<_> = store.quotes().iter().filter(|q| q.text == "dup").collect();
    assert_eq!(remaining[0].category, "D");
    assert_eq!(remaining[1].category, "C");
}

#[test]
fn edit_missing_key_reports_not_found() {
    let mut store = fresh_store();
    let before = store.export_all();

    let err = store.edit(&QuoteKey::new("nope", "none"), "x", "y").unwrap_err();

    assert!(matches!(err, StoreError::NotFound(_)));
    assert_eq!(store.export_all(), before);
}

#[test]
fn delete_removes_first_match_and_rebuilds_categories() {
    let mut store = fresh_store();
    let key = QuoteKey::new("Simplicity is the ultimate sophistication.", "Philosophy");

    store.delete(&key).unwrap();

    assert!(store.find(&key).is_none());
    assert!(!store.categories().contains("Philosophy"));
}

#[test]
fn delete_missing_key_leaves_collection_unchanged() {
    let mut store = fresh_store();
    let before = store.len();

    let err = store.delete(&QuoteKey::new("ghost", "Nowhere")).unwrap_err();

    assert!(matches!(err, StoreError::NotFound(_)));
    assert_eq!(store.len(), before);
}

#[test]
fn import_of_own_export_adds_nothing() {
    let mut store = fresh_store();
    store.add("extra", "Mine").unwrap();

    let added = store.import_merge(store.export_all()).unwrap();

    assert_eq!(added, 0);
}

#[test]
fn import_dedupes_by_text_and_category() {
    let mut store = fresh_store();
    let before = store.len();

    let added = store
        .import_merge(vec![
            QuoteRecord::new("Do one thing every day that scares you.", "Courage"),
            QuoteRecord::new("Do one thing every day that scares you.", "Fear"),
            QuoteRecord::new("", "Empty"),
            QuoteRecord::new("brand new", "Fresh"),
        ])
        .unwrap();

    assert_eq!(added, 2);
    assert_eq!(store.len(), before + 2);
    assert!(store.categories().contains("Fear"));
}

#[test]
fn merge_remote_dedupes_by_text_only() {
    let storage = MemoryKvStore::with_entries([(QUOTES_KEY, r#"[{"text":"A","category":"L"}]"#)]);
    let mut store = QuoteStore::load(storage);

    let added = store
        .merge_remote(vec![QuoteRecord::new("A", "Server"), QuoteRecord::new("B", "Server")])
        .unwrap();

    assert_eq!(added, 1);
    assert_eq!(
        store.export_all(),
        vec![QuoteRecord::new("A", "L"), QuoteRecord::new("B", "Server")]
    );
}

#[test]
fn clear_restores_defaults_and_persists() {
    let storage = Arc::new(MemoryKvStore::new());
    let mut store = QuoteStore::load(Arc::clone(&storage));
    store.add("temporary", "Temp").unwrap();

    store.clear().unwrap();

    assert_eq!(store.len(), 5);
    assert!(!store.categories().contains("Temp"));
    let persisted = storage.get(QUOTES_KEY).unwrap().unwrap();
    assert!(!persisted.contains("temporary"));
}
