//! Read queries for the catalog database.
//!
//! Provides box-set and cast listings, statistics, import history, and the
//! detection queries behind the relationship integrity audit.

use cinevault_catalog::types::*;
use rusqlite::{Connection, params};

use crate::operations::{ENTRY_COLUMNS, OperationError, row_to_appearance, row_to_entry};

// ── Entry Lookups ───────────────────────────────────────────────────────────

/// List the children of a box set, ordered by id.
pub fn children_of(conn: &Connection, parent_id: i64) -> Result<Vec<CatalogEntry>, OperationError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ENTRY_COLUMNS} FROM catalog_entries WHERE parent_id = ?1 ORDER BY id"
    ))?;
    let rows = stmt.query_map(params![parent_id], row_to_entry)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// List all entries, ordered by id.
pub fn list_entries(conn: &Connection) -> Result<Vec<CatalogEntry>, OperationError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ENTRY_COLUMNS} FROM catalog_entries ORDER BY id"
    ))?;
    let rows = stmt.query_map([], row_to_entry)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

// ── Cast Lookups ────────────────────────────────────────────────────────────

/// A person together with their appearance on one entry.
#[derive(Debug, Clone)]
pub struct CastRow {
    pub person: Person,
    pub appearance: Appearance,
}

/// List everyone appearing on an entry in billing order.
pub fn appearances_for_entry(
    conn: &Connection,
    entry_id: i64,
) -> Result<Vec<CastRow>, OperationError> {
    let mut stmt = conn.prepare(
        "SELECT a.entry_id, a.person_id, a.role, a.sort_order, p.first_name, p.last_name
         FROM appearances a JOIN persons p ON p.id = a.person_id
         WHERE a.entry_id = ?1
         ORDER BY a.sort_order, p.last_name, p.first_name",
    )?;
    let rows = stmt.query_map(params![entry_id], |row| {
        let appearance = row_to_appearance(row)?;
        Ok(CastRow {
            person: Person {
                id: appearance.person_id,
                first_name: row.get(4)?,
                last_name: row.get(5)?,
            },
            appearance,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

// ── Statistics ──────────────────────────────────────────────────────────────

/// Get overall catalog statistics.
pub fn catalog_stats(conn: &Connection) -> Result<CatalogStats, OperationError> {
    let entries: i64 =
        conn.query_row("SELECT COUNT(*) FROM catalog_entries", [], |r| r.get(0))?;
    let box_set_children: i64 = conn.query_row(
        "SELECT COUNT(*) FROM catalog_entries WHERE parent_id IS NOT NULL",
        [],
        |r| r.get(0),
    )?;
    let persons: i64 = conn.query_row("SELECT COUNT(*) FROM persons", [], |r| r.get(0))?;
    let appearances: i64 =
        conn.query_row("SELECT COUNT(*) FROM appearances", [], |r| r.get(0))?;
    let imports: i64 = conn.query_row("SELECT COUNT(*) FROM import_log", [], |r| r.get(0))?;

    Ok(CatalogStats {
        entries,
        box_set_children,
        persons,
        appearances,
        imports,
    })
}

/// Summary statistics for the catalog.
#[derive(Debug, serde::Serialize)]
pub struct CatalogStats {
    pub entries: i64,
    pub box_set_children: i64,
    pub persons: i64,
    pub appearances: i64,
    pub imports: i64,
}

// ── Import Log Queries ──────────────────────────────────────────────────────

/// List recent import logs.
pub fn list_import_logs(
    conn: &Connection,
    limit: Option<u32>,
) -> Result<Vec<ImportLog>, OperationError> {
    let limit = limit.unwrap_or(20);
    let mut stmt = conn.prepare(&format!(
        "SELECT id, source_name, imported_at, entries_imported, entries_skipped,
                entries_failed, persons_created, appearances_created, relations_repaired
         FROM import_log ORDER BY imported_at DESC, id DESC LIMIT {limit}"
    ))?;
    let rows = stmt.query_map([], |row| {
        Ok(ImportLog {
            id: row.get(0)?,
            source_name: row.get(1)?,
            imported_at: row.get(2)?,
            entries_imported: row.get(3)?,
            entries_skipped: row.get(4)?,
            entries_failed: row.get(5)?,
            persons_created: row.get(6)?,
            appearances_created: row.get(7)?,
            relations_repaired: row.get(8)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

// ── Integrity Queries ───────────────────────────────────────────────────────

/// A child → parent link as stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentLink {
    pub entry_id: i64,
    pub parent_id: i64,
}

/// Entries whose parent reference points at a missing row.
pub fn find_dangling_parents(conn: &Connection) -> Result<Vec<ParentLink>, OperationError> {
    let mut stmt = conn.prepare(
        "SELECT c.id, c.parent_id FROM catalog_entries c
         WHERE c.parent_id IS NOT NULL
           AND NOT EXISTS (SELECT 1 FROM catalog_entries p WHERE p.id = c.parent_id)
         ORDER BY c.id",
    )?;
    let rows = stmt.query_map([], row_to_link)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Pairs of distinct entries that name each other as parent.
///
/// Each cycle is returned twice, once from each side, ordered by the first
/// entry's id.
pub fn find_parent_cycles(conn: &Connection) -> Result<Vec<ParentLink>, OperationError> {
    let mut stmt = conn.prepare(
        "SELECT a.id, a.parent_id FROM catalog_entries a
         JOIN catalog_entries b ON a.parent_id = b.id AND b.parent_id = a.id
         WHERE a.id <> b.id
         ORDER BY a.id",
    )?;
    let rows = stmt.query_map([], row_to_link)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Entries that name themselves as parent.
pub fn find_self_parents(conn: &Connection) -> Result<Vec<ParentLink>, OperationError> {
    let mut stmt = conn.prepare(
        "SELECT id, parent_id FROM catalog_entries WHERE parent_id = id ORDER BY id",
    )?;
    let rows = stmt.query_map([], row_to_link)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

fn row_to_link(row: &rusqlite::Row<'_>) -> rusqlite::Result<ParentLink> {
    Ok(ParentLink {
        entry_id: row.get(0)?,
        parent_id: row.get(1)?,
    })
}
