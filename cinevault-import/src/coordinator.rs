//! Import entry points: one document, one write transaction.
//!
//! The whole import runs inside a single `BEGIN IMMEDIATE` transaction so a
//! second import against the same database waits for the write lock instead
//! of racing the duplicate checks. Any fatal error drops the transaction,
//! which rolls back every write made so far.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use cinevault_catalog::ImportLog;
use cinevault_db::operations::{self, OperationError};
use cinevault_export::{ExportDocument, ExportError, PayloadKind};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use serde::Serialize;
use thiserror::Error;

use crate::audit::{self, AuditReport};
use crate::batch::ImportBatch;
use crate::entity;
use crate::progress::ImportProgress;
use crate::stats::ImportStatistics;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Could not read export: {0}")]
    Export(#[from] ExportError),
    #[error("Export contains no entries with a usable collection number")]
    NoUsableEntries,
    #[error("Database error: {0}")]
    Db(#[from] OperationError),
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Caller-supplied settings for one import.
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Name recorded in the import log, usually the uploaded file name.
    pub source_name: String,
    /// Where raw payloads are archived before parsing. `None` disables it.
    pub archive_dir: Option<PathBuf>,
}

/// Result of a committed import.
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub stats: ImportStatistics,
    pub audit: AuditReport,
    pub archived_to: Option<PathBuf>,
    pub summary: String,
}

/// Import an export file from disk.
///
/// The source name defaults to the file name when `options` leaves it empty.
pub fn import_file(
    conn: &Connection,
    path: &Path,
    options: &ImportOptions,
    progress: Option<&dyn ImportProgress>,
) -> Result<ImportReport, ImportError> {
    let bytes = fs::read(path).map_err(ExportError::from)?;

    let mut options = options.clone();
    if options.source_name.is_empty() {
        options.source_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
    }

    import_payload(conn, &bytes, &options, progress)
}

/// Import a raw uploaded payload: XML or a single-document zip archive.
///
/// The payload is archived first, whether or not the import succeeds.
/// Archive failures are logged and do not abort the import.
pub fn import_payload(
    conn: &Connection,
    bytes: &[u8],
    options: &ImportOptions,
    progress: Option<&dyn ImportProgress>,
) -> Result<ImportReport, ImportError> {
    let archived_to = match &options.archive_dir {
        Some(dir) => match archive_payload(dir, bytes, Utc::now()) {
            Ok(path) => {
                log::info!("Archived upload to {}", path.display());
                Some(path)
            }
            Err(e) => {
                log::warn!("Could not archive upload in {}: {}", dir.display(), e);
                None
            }
        },
        None => None,
    };

    let document = cinevault_export::load_payload(bytes).inspect_err(|e| {
        log::error!("Import of {} aborted: {}", options.source_name, e);
    })?;

    let mut report = import_document(conn, &document, &options.source_name, progress)?;
    report.archived_to = archived_to;
    Ok(report)
}

/// Import an already-parsed document.
pub fn import_document(
    conn: &Connection,
    document: &ExportDocument,
    source_name: &str,
    progress: Option<&dyn ImportProgress>,
) -> Result<ImportReport, ImportError> {
    let batch = ImportBatch::discover(&document.entries);
    if batch.usable_entries() == 0 {
        log::error!(
            "Import of {} aborted: none of {} entries has a usable key",
            source_name,
            document.entries.len(),
        );
        return Err(ImportError::NoUsableEntries);
    }

    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    let (stats, audit) = run_import(&tx, &batch, document, source_name, progress)?;
    tx.commit()?;

    let summary = stats.render_summary();
    if let Some(p) = progress {
        p.on_complete(&format!(
            "Imported {} of {} entries from {}",
            stats.imported, stats.entries_seen, source_name
        ));
    }

    Ok(ImportReport {
        stats,
        audit,
        archived_to: None,
        summary,
    })
}

/// Everything that happens between BEGIN and COMMIT.
fn run_import(
    tx: &Transaction<'_>,
    batch: &ImportBatch,
    document: &ExportDocument,
    source_name: &str,
    progress: Option<&dyn ImportProgress>,
) -> Result<(ImportStatistics, AuditReport), ImportError> {
    let mut stats = ImportStatistics::default();
    let total = document.entries.len();

    if let Some(p) = progress {
        p.on_phase(&format!("Importing {} entries from {}", total, source_name));
    }

    for (i, entry) in document.entries.iter().enumerate() {
        let outcome = entity::import_entry(tx, batch, entry)?;
        stats.record(&outcome);

        if let Some(p) = progress {
            p.on_entry(i + 1, total, entry.title.as_deref().unwrap_or(""), &outcome);
        }
    }

    if let Some(p) = progress {
        p.on_phase("Auditing box-set relationships");
    }
    let audit = audit::audit_relationships(tx)?;
    stats.record_audit(&audit);
    if let Some(p) = progress {
        p.on_audit(&audit);
    }

    operations::insert_import_log(tx, &import_log(source_name, &stats, Utc::now()))?;

    Ok((stats, audit))
}

fn import_log(source_name: &str, stats: &ImportStatistics, at: DateTime<Utc>) -> ImportLog {
    ImportLog {
        id: 0,
        source_name: source_name.to_string(),
        imported_at: at.to_rfc3339(),
        entries_imported: stats.imported as i64,
        entries_skipped: (stats.skipped_duplicates + stats.invalid_keys) as i64,
        entries_failed: stats.failed as i64,
        persons_created: stats.persons_created as i64,
        appearances_created: stats.appearances_created as i64,
        relations_repaired: stats.relations_repaired() as i64,
    }
}

/// Write the raw payload to `dir` as `import-<YYYYmmdd-HHMMSS>.<xml|zip>`.
///
/// A numeric suffix is appended when a file with that name already exists.
pub fn archive_payload(dir: &Path, bytes: &[u8], at: DateTime<Utc>) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;

    let stem = format!("import-{}", at.format("%Y%m%d-%H%M%S"));
    let extension = PayloadKind::detect(bytes).extension();

    let mut attempt = 0u32;
    loop {
        let name = if attempt == 0 {
            format!("{stem}.{extension}")
        } else {
            format!("{stem}-{attempt}.{extension}")
        };
        let path = dir.join(name);

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                file.write_all(bytes)?;
                return Ok(path);
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn archive_names_use_timestamp_and_kind() {
        let dir = tempfile::tempdir().unwrap();
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();

        let xml = archive_payload(dir.path(), b"<Collection/>", at).unwrap();
        assert_eq!(xml.file_name().unwrap(), "import-20240309-140507.xml");

        let zip = archive_payload(dir.path(), b"PK\x03\x04rest", at).unwrap();
        assert_eq!(zip.file_name().unwrap(), "import-20240309-140507.zip");
    }

    #[test]
    fn archive_name_collision_gets_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();

        let first = archive_payload(dir.path(), b"<a/>", at).unwrap();
        let second = archive_payload(dir.path(), b"<b/>", at).unwrap();
        assert_ne!(first, second);
        assert_eq!(second.file_name().unwrap(), "import-20240309-140507-1.xml");
        assert_eq!(fs::read(&second).unwrap(), b"<b/>");
    }

    #[test]
    fn import_log_counts_skips_together() {
        let stats = ImportStatistics {
            imported: 3,
            skipped_duplicates: 2,
            invalid_keys: 1,
            cycles_repaired: 1,
            ..Default::default()
        };
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let log = import_log("upload.xml", &stats, at);
        assert_eq!(log.entries_imported, 3);
        assert_eq!(log.entries_skipped, 3);
        assert_eq!(log.relations_repaired, 1);
        assert_eq!(log.imported_at, "2024-01-01T00:00:00+00:00");
    }
}
