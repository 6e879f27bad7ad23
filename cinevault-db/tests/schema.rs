use cinevault_db::schema::{CURRENT_VERSION, create_schema, get_schema_version};
use cinevault_db::{open_database, open_memory};

#[test]
fn create_schema_in_memory() {
    let conn = open_memory().unwrap();
    assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_VERSION);
}

#[test]
fn schema_is_idempotent() {
    let conn = open_memory().unwrap();
    // Creating again should not error
    create_schema(&conn).unwrap();
}

#[test]
fn foreign_keys_enabled() {
    let conn = open_memory().unwrap();
    let fk: i32 = conn
        .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
        .unwrap();
    assert_eq!(fk, 1);
}

#[test]
fn all_tables_exist() {
    let conn = open_memory().unwrap();
    let tables = [
        "schema_version",
        "catalog_entries",
        "persons",
        "appearances",
        "import_log",
    ];
    for table in tables {
        let exists: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name=?1)",
                [table],
                |row| row.get(0),
            )
            .unwrap();
        assert!(exists, "table '{}' should exist", table);
    }
}

#[test]
fn open_database_creates_parent_dirs_and_reopens() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("catalog.db");

    {
        let conn = open_database(&path).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_VERSION);
    }
    assert!(path.exists());

    let conn = open_database(&path).unwrap();
    assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_VERSION);
}

#[test]
fn migrates_version_one_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("old.db");

    {
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE schema_version (version INTEGER NOT NULL,
                 applied_at TEXT NOT NULL DEFAULT (datetime('now')));
             INSERT INTO schema_version (version) VALUES (1);
             CREATE TABLE catalog_entries (id INTEGER PRIMARY KEY, external_id TEXT,
                 title TEXT NOT NULL, release_year INTEGER, genre TEXT, runtime INTEGER,
                 age_rating INTEGER, overview TEXT, collection_kind TEXT, parent_id INTEGER,
                 created_at TEXT NOT NULL DEFAULT (datetime('now')));",
        )
        .unwrap();
    }

    let conn = open_database(&path).unwrap();
    assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_VERSION);
    let exists: bool = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='import_log')",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert!(exists);
}
