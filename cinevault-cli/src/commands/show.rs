use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::CliError;

use super::open_catalog;

/// Print one entry with its parent, box-set children and cast.
pub(crate) fn run_show(db_path: &Path, id: i64) -> Result<(), CliError> {
    let conn = open_catalog(db_path)?;

    let Some(entry) = cinevault_db::get_entry(&conn, id)
        .map_err(|e| CliError::database(format!("Failed to look up entry {}: {}", id, e)))?
    else {
        log::warn!("No catalog entry with id {}", id);
        return Ok(());
    };

    let year = entry
        .release_year
        .map(|y| format!(" ({y})"))
        .unwrap_or_default();
    log::info!(
        "{}{}",
        entry.title.if_supports_color(Stdout, |t| t.bold()),
        year,
    );
    log::info!("  Id:         {}", entry.id);
    if let Some(ext) = &entry.external_id {
        log::info!("  External:   {}", ext);
    }
    if let Some(genre) = &entry.genre {
        log::info!("  Genre:      {}", genre);
    }
    if let Some(runtime) = entry.runtime {
        log::info!("  Runtime:    {} min", runtime);
    }
    if let Some(rating) = entry.age_rating {
        log::info!("  Age rating: {}", rating);
    }
    if let Some(kind) = &entry.collection_kind {
        log::info!("  Collection: {}", kind.as_str());
    }
    if let Some(parent_id) = entry.parent_id {
        let parent = cinevault_db::get_entry(&conn, parent_id)
            .map_err(|e| CliError::database(e.to_string()))?;
        match parent {
            Some(p) => log::info!("  Box set:    {} ({})", p.title, p.id),
            None => log::info!("  Box set:    {} (missing)", parent_id),
        }
    }

    let children = cinevault_db::children_of(&conn, id)
        .map_err(|e| CliError::database(e.to_string()))?;
    if !children.is_empty() {
        log::info!("");
        log::info!("{}", "Contents".if_supports_color(Stdout, |t| t.bold()));
        for child in &children {
            log::info!("  {:>6}  {}", child.id, child.title);
        }
    }

    let cast = cinevault_db::appearances_for_entry(&conn, id)
        .map_err(|e| CliError::database(e.to_string()))?;
    if !cast.is_empty() {
        log::info!("");
        log::info!("{}", "Cast & crew".if_supports_color(Stdout, |t| t.bold()));
        for row in &cast {
            match &row.appearance.role {
                Some(role) => log::info!(
                    "  {} {}",
                    row.person.full_name(),
                    format!("as {role}").if_supports_color(Stdout, |t| t.dimmed()),
                ),
                None => log::info!("  {}", row.person.full_name()),
            }
        }
    }

    Ok(())
}
