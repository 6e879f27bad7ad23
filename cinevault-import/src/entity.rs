//! Create-only import of a single export entry.
//!
//! Existing keys are never updated: re-importing a file is a no-op for every
//! entry already in the catalog.

use cinevault_catalog::types::*;
use cinevault_db::operations;
use cinevault_export::ExportEntry;
use rusqlite::Transaction;

use crate::batch::{ImportBatch, ParentResolution};
use crate::coordinator::ImportError;
use crate::people;
use crate::stats::{EntryOutcome, SkipReason};

const PEOPLE_SAVEPOINT: &str = "link_people";

/// Import one entry inside the caller's transaction.
///
/// Per-entry problems come back as [`EntryOutcome::Skipped`] or
/// [`EntryOutcome::Failed`]. Only storage failures (the existence check or
/// the cast/crew savepoint itself) are fatal.
pub fn import_entry(
    tx: &Transaction<'_>,
    batch: &ImportBatch,
    entry: &ExportEntry,
) -> Result<EntryOutcome, ImportError> {
    let Some(id) = entry.internal_key.filter(|k| *k > 0) else {
        log::debug!(
            "Skipping {:?}: missing or invalid internal key {:?}",
            display_title(entry),
            entry.internal_key,
        );
        return Ok(EntryOutcome::Skipped(SkipReason::InvalidKey));
    };

    if operations::entry_exists(tx, id)? {
        log::debug!("Skipping {} ({}): already in catalog", id, display_title(entry));
        return Ok(EntryOutcome::Skipped(SkipReason::Duplicate));
    }

    let Some(title) = entry
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
    else {
        log::warn!("Failed to import entry {}: no title", id);
        return Ok(EntryOutcome::Failed {
            id,
            title: String::new(),
            reason: "missing title".to_string(),
        });
    };

    let external_id = entry
        .external_id
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty());

    let parent = batch.resolve_parent(external_id);
    if let ParentResolution::Unresolved { parent_external_id } = &parent {
        log::warn!(
            "Box set {} of {} ({}) has no usable key; leaving parent empty",
            parent_external_id,
            id,
            title,
        );
    }

    let record = CatalogEntry {
        id,
        external_id: external_id.map(str::to_string),
        title: title.to_string(),
        release_year: entry.release_year,
        genre: join_genres(&entry.genres),
        runtime: entry.runtime,
        age_rating: entry.rating.as_deref().and_then(parse_age_rating),
        overview: entry
            .overview
            .as_deref()
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string),
        collection_kind: entry
            .collection_kind
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(CollectionKind::from_str_loose),
        parent_id: parent.key(),
        created_at: String::new(),
    };

    if let Err(e) = operations::insert_entry(tx, &record) {
        log::error!("Failed to import entry {} ({}): {}", id, title, e);
        return Ok(EntryOutcome::Failed {
            id,
            title: title.to_string(),
            reason: e.to_string(),
        });
    }

    let people = link_people_isolated(tx, id, title, entry)?;

    Ok(EntryOutcome::Imported { id, parent, people })
}

/// Link cast and crew inside a savepoint so a failure leaves the entry row
/// in place. Returns `Ok(None)` when linking was rolled back.
///
/// Failing to open or roll back the savepoint is fatal: the transaction
/// could otherwise commit half-linked people.
fn link_people_isolated(
    tx: &Transaction<'_>,
    id: i64,
    title: &str,
    entry: &ExportEntry,
) -> Result<Option<people::LinkStats>, ImportError> {
    if entry.people.is_empty() {
        return Ok(Some(people::LinkStats::default()));
    }

    tx.execute_batch(&format!("SAVEPOINT {PEOPLE_SAVEPOINT}"))?;

    match people::link_people(tx, id, &entry.people) {
        Ok(linked) => match tx.execute_batch(&format!("RELEASE {PEOPLE_SAVEPOINT}")) {
            Ok(()) => Ok(Some(linked)),
            Err(e) => {
                log::error!("Could not release savepoint for {} ({}): {}", id, title, e);
                rollback_savepoint(tx)?;
                Ok(None)
            }
        },
        Err(e) => {
            log::error!("Cast/crew linking failed for {} ({}): {}", id, title, e);
            rollback_savepoint(tx)?;
            Ok(None)
        }
    }
}

fn rollback_savepoint(tx: &Transaction<'_>) -> Result<(), ImportError> {
    let sql = format!("ROLLBACK TO {PEOPLE_SAVEPOINT}; RELEASE {PEOPLE_SAVEPOINT}");
    tx.execute_batch(&sql).map_err(|e| {
        log::error!("Savepoint rollback failed: {}", e);
        ImportError::from(e)
    })
}

fn display_title(entry: &ExportEntry) -> &str {
    entry.title.as_deref().unwrap_or("<untitled>")
}

fn join_genres(genres: &[String]) -> Option<String> {
    let genres: Vec<&str> = genres
        .iter()
        .map(|g| g.trim())
        .filter(|g| !g.is_empty())
        .collect();
    if genres.is_empty() {
        None
    } else {
        Some(genres.join(", "))
    }
}

/// Extract the numeric age rating from free text.
///
/// Takes the first run of ASCII digits: "FSK 12" → 12, "PG-13" → 13.
/// Text without digits, or a number above 255, yields `None`.
pub fn parse_age_rating(text: &str) -> Option<u8> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let digits: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}
