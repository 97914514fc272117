//! Unit tests for the persistence store: seeding, round-trips, and corruption.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use markwise::database::Database;
use markwise::services::storage_service::{
    seed_bookmarks, BookmarkStore, BookmarkStoreTrait, STORAGE_KEY,
};
use markwise::types::bookmark::Bookmark;
use markwise::types::errors::StoreError;

fn setup() -> (Arc<Database>, BookmarkStore) {
    let db = Arc::new(Database::open_in_memory().expect("Failed to open in-memory database"));
    let store = BookmarkStore::new(db.clone());
    (db, store)
}

fn sample(id: &str) -> Bookmark {
    Bookmark {
        id: id.to_string(),
        url: format!("https://{}.example", id),
        title: format!("Title {}", id),
        description: "desc".to_string(),
        ai_summary: "summary".to_string(),
        ai_key_points: vec!["a".to_string()],
        ai_category: "Technology".to_string(),
        ai_tags: vec!["Rust".to_string()],
        og_image: None,
        favicon: None,
        is_public: true,
        is_archived: false,
        is_favorite: false,
        created_at: Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap(),
    }
}

#[test]
fn test_first_load_seeds_two_records() {
    let (db, store) = setup();
    let bookmarks = store.load().unwrap();

    assert_eq!(bookmarks.len(), 2);
    assert_eq!(bookmarks[0].id, "1");
    assert_eq!(bookmarks[0].url, "https://react.dev");
    assert_eq!(bookmarks[1].id, "2");
    assert_eq!(bookmarks[1].ai_category, "Design");
    assert!(db.read_slot(STORAGE_KEY).unwrap().is_some(), "seed should be persisted");
}

#[test]
fn test_seed_is_not_rewritten_on_second_load() {
    let (_db, store) = setup();
    let first = store.load().unwrap();
    let second = store.load().unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_empty_collection_is_not_reseeded() {
    let (_db, store) = setup();
    store.save(&[]).unwrap();
    assert!(store.load().unwrap().is_empty());
}

#[test]
fn test_save_then_load_preserves_order() {
    let (_db, store) = setup();
    let items = vec![sample("c"), sample("a"), sample("b")];
    store.save(&items).unwrap();
    assert_eq!(store.load().unwrap(), items);
}

#[test]
fn test_corrupt_slot_is_reported_and_left_untouched() {
    let (db, store) = setup();
    db.write_slot(STORAGE_KEY, "{not json").unwrap();

    let err = store.load().unwrap_err();
    assert!(matches!(err, StoreError::CorruptStore(_)));
    assert_eq!(db.read_slot(STORAGE_KEY).unwrap().as_deref(), Some("{not json"));
}

#[test]
fn test_records_missing_optional_fields_decode_with_defaults() {
    let (db, store) = setup();
    db.write_slot(
        STORAGE_KEY,
        r#"[{"id":"x","url":"https://x.io","created_at":"2024-05-01T00:00:00Z"}]"#,
    )
    .unwrap();

    let bookmarks = store.load().unwrap();
    assert_eq!(bookmarks.len(), 1);
    assert_eq!(bookmarks[0].title, "");
    assert!(bookmarks[0].ai_tags.is_empty());
    assert!(!bookmarks[0].is_favorite);
}

#[test]
fn test_seed_matches_fixed_content() {
    let now = Utc::now();
    let seed = seed_bookmarks(now);
    assert_eq!(seed[0].ai_tags, vec!["React", "JavaScript", "Frontend"]);
    assert!(seed[0].is_favorite);
    assert_eq!(seed[1].url, "https://tailwindcss.com");
    assert_eq!((now - seed[1].created_at).num_seconds(), 5_000);
}
