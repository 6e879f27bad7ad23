use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::CliError;

use super::open_catalog;

pub(crate) fn run_stats(db_path: &Path, limit: u32, json: bool) -> Result<(), CliError> {
    if !db_path.exists() {
        log::warn!("No catalog database found at {}", db_path.display());
        log::info!("Run 'cinevault import <file>' to create one.");
        return Ok(());
    }

    let conn = open_catalog(db_path)?;

    let stats = cinevault_db::catalog_stats(&conn)
        .map_err(|e| CliError::database(format!("Failed to query catalog stats: {}", e)))?;
    let imports = cinevault_db::list_import_logs(&conn, Some(limit))
        .map_err(|e| CliError::database(format!("Failed to list imports: {}", e)))?;

    if json {
        let value = serde_json::json!({
            "stats": stats,
            "imports": imports,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    log::info!(
        "{}",
        "Catalog Database Statistics".if_supports_color(Stdout, |t| t.bold()),
    );
    log::info!("  Database: {}", db_path.display());
    log::info!("");
    log::info!("  Entries:          {:>8}", stats.entries);
    log::info!("  Box-set children: {:>8}", stats.box_set_children);
    log::info!("  Persons:          {:>8}", stats.persons);
    log::info!("  Appearances:      {:>8}", stats.appearances);
    log::info!("  Imports:          {:>8}", stats.imports);

    if imports.is_empty() {
        return Ok(());
    }

    log::info!("");
    log::info!("{}", "Recent imports".if_supports_color(Stdout, |t| t.bold()));
    for import in &imports {
        log::info!(
            "  {}  {}: {} imported, {} skipped, {} failed, {} repaired",
            import.imported_at.if_supports_color(Stdout, |t| t.dimmed()),
            import.source_name.if_supports_color(Stdout, |t| t.cyan()),
            import.entries_imported,
            import.entries_skipped,
            import.entries_failed,
            import.relations_repaired,
        );
    }

    Ok(())
}
