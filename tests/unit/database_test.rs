//! Unit tests for the database layer: migrations and key-value slots.

use markwise::database::migrations::{get_schema_version, run_all, CURRENT_SCHEMA_VERSION};
use markwise::database::Database;
use tempfile::TempDir;

#[test]
fn test_open_in_memory_applies_migrations() {
    let db = Database::open_in_memory().expect("Failed to open in-memory database");
    assert_eq!(get_schema_version(db.connection()), CURRENT_SCHEMA_VERSION);

    let count: i64 = db
        .connection()
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'kv_store'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn test_migrations_are_idempotent() {
    let db = Database::open_in_memory().unwrap();
    run_all(db.connection()).unwrap();
    run_all(db.connection()).unwrap();
    let versions: i64 = db
        .connection()
        .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
        .unwrap();
    assert_eq!(versions, 1);
}

#[test]
fn test_unwritten_slot_reads_none() {
    let db = Database::open_in_memory().unwrap();
    assert_eq!(db.read_slot("missing").unwrap(), None);
}

#[test]
fn test_write_slot_overwrites() {
    let db = Database::open_in_memory().unwrap();
    db.write_slot("k", "first").unwrap();
    db.write_slot("k", "second").unwrap();
    assert_eq!(db.read_slot("k").unwrap().as_deref(), Some("second"));
}

#[test]
fn test_clear_slot() {
    let db = Database::open_in_memory().unwrap();
    db.write_slot("k", "v").unwrap();
    db.clear_slot("k").unwrap();
    db.clear_slot("never-written").unwrap();
    assert_eq!(db.read_slot("k").unwrap(), None);
}

#[test]
fn test_file_database_persists_across_reopen() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("nested").join("markwise.db");

    {
        let db = Database::open(&path).expect("open should create parent directories");
        db.write_slot("k", "[1,2,3]").unwrap();
    }

    let db = Database::open(&path).unwrap();
    assert_eq!(db.read_slot("k").unwrap().as_deref(), Some("[1,2,3]"));
}
