//! Cast and crew deduplication.
//!
//! Persons are matched by exact `(first_name, last_name)`; there is no fuzzy
//! matching. Each matched or created person is linked to the entry through
//! an appearance row carrying the role and billing order.

use cinevault_catalog::Appearance;
use cinevault_db::operations::{self, AppearanceWrite, OperationError};
use cinevault_export::ExportPerson;
use rusqlite::Transaction;
use serde::Serialize;

/// Counters from linking one entry's people.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LinkStats {
    pub persons_created: u64,
    pub appearances_created: u64,
    pub appearances_updated: u64,
}

/// Find-or-create every named person and upsert their appearance on `entry_id`.
///
/// Descriptors with an empty name are skipped. When the source gives no
/// billing order, the descriptor's position in the list is used.
pub fn link_people(
    tx: &Transaction<'_>,
    entry_id: i64,
    people: &[ExportPerson],
) -> Result<LinkStats, OperationError> {
    let mut stats = LinkStats::default();

    for (position, person) in people.iter().enumerate() {
        let name = person.name.trim();
        if name.is_empty() {
            continue;
        }
        let (first_name, last_name) = split_name(name);

        let person_id = match operations::find_person(tx, first_name, last_name)? {
            Some(existing) => existing.id,
            None => {
                stats.persons_created += 1;
                operations::insert_person(tx, first_name, last_name)?
            }
        };

        let appearance = Appearance {
            entry_id,
            person_id,
            role: person.role.clone().filter(|r| !r.trim().is_empty()),
            sort_order: person.order.unwrap_or(position as i64),
        };
        match operations::upsert_appearance(tx, &appearance)? {
            AppearanceWrite::Created => stats.appearances_created += 1,
            AppearanceWrite::Updated => stats.appearances_updated += 1,
        }
    }

    Ok(stats)
}

/// Split a display name into first token and remainder.
///
/// `"Mary Elizabeth Winstead"` → `("Mary", "Elizabeth Winstead")`,
/// `"Cher"` → `("Cher", "")`.
pub fn split_name(name: &str) -> (&str, &str) {
    let name = name.trim();
    match name.split_once(char::is_whitespace) {
        Some((first, rest)) => (first, rest.trim()),
        None => (name, ""),
    }
}
