use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::CliError;

use super::open_catalog;

/// Run the box-set relationship audit on its own.
pub(crate) fn run_audit(db_path: &Path, json: bool) -> Result<(), CliError> {
    if !db_path.exists() {
        log::warn!("No catalog database found at {}", db_path.display());
        return Ok(());
    }

    let conn = open_catalog(db_path)?;
    let report = cinevault_import::audit_catalog(&conn)
        .map_err(|e| CliError::database(format!("Audit failed: {}", e)))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if report.is_clean() {
        log::info!(
            "{} No broken box-set relationships",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        );
        return Ok(());
    }

    log::info!(
        "{}",
        format!("Repaired {} relationship(s)", report.repairs.len())
            .if_supports_color(Stdout, |t| t.bold()),
    );
    for repair in &report.repairs {
        log::info!(
            "  entry {:>6}: {} (parent {} cleared)",
            repair.entry_id,
            repair.kind.if_supports_color(Stdout, |t| t.yellow()),
            repair.former_parent,
        );
    }
    log::info!(
        "  {} dangling, {} cyclic, {} self-referencing",
        report.dangling(),
        report.cycles(),
        report.self_references(),
    );

    Ok(())
}
