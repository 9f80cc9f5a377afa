use habit_core::db::migrations::latest_version;
use habit_core::db::{open_db, open_db_in_memory, DbError};
use habit_core::{Habit, HabitStore, HealthDataType, SqliteHabitStore, StoreError, HABITS_STORAGE_KEY};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "kv_store");
}

#[test]
fn open_db_creates_missing_parent_directory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("habits.sqlite3");

    let conn = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    assert!(path.exists());
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn load_without_saved_document_is_empty() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteHabitStore::new(&conn);
    assert!(store.load().unwrap().is_empty());
}

#[test]
fn save_then_load_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("habits.sqlite3");

    let mut walk = Habit::new("Walk", "figure.walk", "34C759");
    walk.link_health(HealthDataType::Steps);
    let read = Habit::new("Read", "book.fill", "5856D6");
    let habits = vec![walk, read];

    {
        let conn = open_db(&path).unwrap();
        SqliteHabitStore::new(&conn).save(&habits).unwrap();
    }

    let conn = open_db(&path).unwrap();
    let loaded = SqliteHabitStore::new(&conn).load().unwrap();
    assert_eq!(loaded, habits);
}

#[test]
fn save_overwrites_single_document() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteHabitStore::new(&conn);

    store.save(&[Habit::new("A", "a", "000000")]).unwrap();
    store.save(&[]).unwrap();

    assert!(store.load().unwrap().is_empty());
    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM kv_store;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);
}

#[test]
fn corrupt_document_reports_decode_error() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO kv_store (key, value) VALUES (?1, ?2);",
        [HABITS_STORAGE_KEY, "[{\"id\": 42}]"],
    )
    .unwrap();

    let err = SqliteHabitStore::new(&conn).load().unwrap_err();
    assert!(matches!(err, StoreError::Decode(_)), "unexpected error: {err}");
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
