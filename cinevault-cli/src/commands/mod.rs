pub(crate) mod audit;
pub(crate) mod config;
pub(crate) mod import;
pub(crate) mod show;
pub(crate) mod stats;

use std::path::Path;

use rusqlite::Connection;

use crate::CliError;

/// Open (or create) the catalog database, mapping failures for display.
pub(crate) fn open_catalog(db_path: &Path) -> Result<Connection, CliError> {
    cinevault_db::open_database(db_path).map_err(|e| {
        CliError::database(format!(
            "Failed to open catalog database at {}: {}",
            db_path.display(),
            e
        ))
    })
}
