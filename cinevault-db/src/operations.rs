//! Create/read/update operations for catalog entries, persons, and appearances.

use cinevault_catalog::types::*;
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OperationError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Entity not found: {entity_type} with id '{id}'")]
    NotFound { entity_type: String, id: String },
}

// ── Catalog Entry Operations ────────────────────────────────────────────────

/// Insert a new catalog entry. `created_at` is assigned by the database.
///
/// Fails if a row with the same id already exists; callers check with
/// [`entry_exists`] first when a duplicate is not an error.
pub fn insert_entry(conn: &Connection, entry: &CatalogEntry) -> Result<(), OperationError> {
    conn.execute(
        "INSERT INTO catalog_entries (id, external_id, title, release_year, genre, runtime,
             age_rating, overview, collection_kind, parent_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            entry.id,
            entry.external_id,
            entry.title,
            entry.release_year,
            entry.genre,
            entry.runtime,
            entry.age_rating,
            entry.overview,
            entry.collection_kind.as_ref().map(|k| k.as_str()),
            entry.parent_id,
        ],
    )?;
    Ok(())
}

/// Check whether a catalog entry with this id exists.
pub fn entry_exists(conn: &Connection, id: i64) -> Result<bool, OperationError> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM catalog_entries WHERE id = ?1)",
        params![id],
        |row| row.get(0),
    )?;
    Ok(exists)
}

/// Fetch a catalog entry by id.
pub fn get_entry(conn: &Connection, id: i64) -> Result<Option<CatalogEntry>, OperationError> {
    let entry = conn
        .query_row(
            &format!("SELECT {ENTRY_COLUMNS} FROM catalog_entries WHERE id = ?1"),
            params![id],
            row_to_entry,
        )
        .optional()?;
    Ok(entry)
}

/// Set or clear an entry's parent reference.
pub fn set_parent(
    conn: &Connection,
    id: i64,
    parent_id: Option<i64>,
) -> Result<(), OperationError> {
    let changed = conn.execute(
        "UPDATE catalog_entries SET parent_id = ?2 WHERE id = ?1",
        params![id, parent_id],
    )?;
    if changed == 0 {
        return Err(OperationError::NotFound {
            entity_type: "catalog entry".to_string(),
            id: id.to_string(),
        });
    }
    Ok(())
}

// ── Person Operations ───────────────────────────────────────────────────────

/// Find a person by exact first and last name.
pub fn find_person(
    conn: &Connection,
    first_name: &str,
    last_name: &str,
) -> Result<Option<Person>, OperationError> {
    let person = conn
        .query_row(
            "SELECT id, first_name, last_name FROM persons
             WHERE first_name = ?1 AND last_name = ?2",
            params![first_name, last_name],
            |row| {
                Ok(Person {
                    id: row.get(0)?,
                    first_name: row.get(1)?,
                    last_name: row.get(2)?,
                })
            },
        )
        .optional()?;
    Ok(person)
}

/// Insert a new person. Returns the generated ID.
pub fn insert_person(
    conn: &Connection,
    first_name: &str,
    last_name: &str,
) -> Result<i64, OperationError> {
    conn.execute(
        "INSERT INTO persons (first_name, last_name) VALUES (?1, ?2)",
        params![first_name, last_name],
    )?;
    Ok(conn.last_insert_rowid())
}

// ── Appearance Operations ───────────────────────────────────────────────────

/// Whether [`upsert_appearance`] created a row or overwrote one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppearanceWrite {
    Created,
    Updated,
}

/// Find the appearance linking an entry and a person.
pub fn find_appearance(
    conn: &Connection,
    entry_id: i64,
    person_id: i64,
) -> Result<Option<Appearance>, OperationError> {
    let appearance = conn
        .query_row(
            "SELECT entry_id, person_id, role, sort_order FROM appearances
             WHERE entry_id = ?1 AND person_id = ?2",
            params![entry_id, person_id],
            row_to_appearance,
        )
        .optional()?;
    Ok(appearance)
}

/// Create the appearance for `(entry_id, person_id)`, or overwrite its role
/// and order if it already exists.
pub fn upsert_appearance(
    conn: &Connection,
    appearance: &Appearance,
) -> Result<AppearanceWrite, OperationError> {
    let updated = conn.execute(
        "UPDATE appearances SET role = ?3, sort_order = ?4
         WHERE entry_id = ?1 AND person_id = ?2",
        params![
            appearance.entry_id,
            appearance.person_id,
            appearance.role,
            appearance.sort_order,
        ],
    )?;
    if updated > 0 {
        return Ok(AppearanceWrite::Updated);
    }

    conn.execute(
        "INSERT INTO appearances (entry_id, person_id, role, sort_order)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            appearance.entry_id,
            appearance.person_id,
            appearance.role,
            appearance.sort_order,
        ],
    )?;
    Ok(AppearanceWrite::Created)
}

// ── Import Log Operations ───────────────────────────────────────────────────

/// Insert an import log entry. Returns the generated ID.
pub fn insert_import_log(conn: &Connection, log: &ImportLog) -> Result<i64, OperationError> {
    conn.execute(
        "INSERT INTO import_log (source_name, imported_at, entries_imported, entries_skipped,
             entries_failed, persons_created, appearances_created, relations_repaired)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            log.source_name,
            log.imported_at,
            log.entries_imported,
            log.entries_skipped,
            log.entries_failed,
            log.persons_created,
            log.appearances_created,
            log.relations_repaired,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

// ── Row Mapping Helpers ─────────────────────────────────────────────────────

pub(crate) const ENTRY_COLUMNS: &str = "id, external_id, title, release_year, genre, runtime,
    age_rating, overview, collection_kind, parent_id, created_at";

pub(crate) fn row_to_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<CatalogEntry> {
    let kind: Option<String> = row.get(8)?;
    Ok(CatalogEntry {
        id: row.get(0)?,
        external_id: row.get(1)?,
        title: row.get(2)?,
        release_year: row.get(3)?,
        genre: row.get(4)?,
        runtime: row.get(5)?,
        age_rating: row.get(6)?,
        overview: row.get(7)?,
        collection_kind: kind.as_deref().map(CollectionKind::from_str_loose),
        parent_id: row.get(9)?,
        created_at: row.get(10)?,
    })
}

pub(crate) fn row_to_appearance(row: &rusqlite::Row<'_>) -> rusqlite::Result<Appearance> {
    Ok(Appearance {
        entry_id: row.get(0)?,
        person_id: row.get(1)?,
        role: row.get(2)?,
        sort_order: row.get(3)?,
    })
}
