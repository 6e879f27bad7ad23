//! Shared application settings (database path, upload archive directory).
//!
//! The settings file is always `~/.config/cinevault/settings.toml`:
//!
//! ```toml
//! [storage]
//! database = "/home/me/movies/catalog.db"
//!
//! [import]
//! archive_dir = "/home/me/movies/uploads"
//! ```

use std::io;
use std::path::{Path, PathBuf};

const STORAGE_SECTION: &str = "storage";
const DATABASE_KEY: &str = "database";
const IMPORT_SECTION: &str = "import";
const ARCHIVE_DIR_KEY: &str = "archive_dir";

/// Canonical path to the shared settings file: `~/.config/cinevault/settings.toml`.
pub(crate) fn settings_path() -> PathBuf {
    let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config.join("cinevault").join("settings.toml")
}

/// Application data directory: `~/.local/share/cinevault` on Linux.
fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cinevault")
}

/// Resolve the catalog database path using a priority chain:
///
/// 1. CLI override (if `Some`)
/// 2. Saved `storage.database` in `settings.toml`
/// 3. `catalog.db` in the application data directory
pub(crate) fn resolve_database_path(cli_override: Option<PathBuf>) -> PathBuf {
    cli_override
        .or_else(|| load_path(&settings_path(), STORAGE_SECTION, DATABASE_KEY))
        .unwrap_or_else(|| data_dir().join("catalog.db"))
}

/// Resolve the upload archive directory the same way as the database path,
/// falling back to `uploads/` in the application data directory.
pub(crate) fn resolve_archive_dir(cli_override: Option<PathBuf>) -> PathBuf {
    cli_override
        .or_else(|| load_path(&settings_path(), IMPORT_SECTION, ARCHIVE_DIR_KEY))
        .unwrap_or_else(|| data_dir().join("uploads"))
}

pub(crate) fn save_database_path(path: &Path) -> io::Result<()> {
    save_path(&settings_path(), STORAGE_SECTION, DATABASE_KEY, Some(path))
}

pub(crate) fn save_archive_dir(path: &Path) -> io::Result<()> {
    save_path(&settings_path(), IMPORT_SECTION, ARCHIVE_DIR_KEY, Some(path))
}

/// Load the full settings file as a pretty-printed TOML string for display.
pub(crate) fn load_settings_string() -> Option<String> {
    let contents = std::fs::read_to_string(settings_path()).ok()?;
    let doc: toml::Value = contents.parse().ok()?;
    toml::to_string_pretty(&doc).ok()
}

/// Read `[section] key` from a settings file, if set and non-empty.
fn load_path(settings: &Path, section: &str, key: &str) -> Option<PathBuf> {
    let contents = std::fs::read_to_string(settings).ok()?;
    let doc: toml::Value = contents.parse().ok()?;
    let value = doc.get(section)?.get(key)?.as_str()?;
    if value.is_empty() {
        None
    } else {
        Some(PathBuf::from(value))
    }
}

/// Save (or clear) `[section] key` in a settings file.
///
/// Uses `toml::Value` for a surgical update so unrelated keys are preserved.
fn save_path(settings: &Path, section: &str, key: &str, path: Option<&Path>) -> io::Result<()> {
    let mut doc: toml::Value = if let Ok(contents) = std::fs::read_to_string(settings) {
        contents
            .parse()
            .unwrap_or_else(|_| toml::Value::Table(Default::default()))
    } else {
        toml::Value::Table(Default::default())
    };

    let table = doc
        .as_table_mut()
        .ok_or_else(|| io::Error::other("settings.toml root is not a table"))?;
    let section_value = table
        .entry(section)
        .or_insert_with(|| toml::Value::Table(Default::default()));
    let section_table = section_value
        .as_table_mut()
        .ok_or_else(|| io::Error::other(format!("[{section}] is not a table")))?;

    match path {
        Some(p) => {
            section_table.insert(
                key.to_string(),
                toml::Value::String(p.to_string_lossy().into_owned()),
            );
        }
        None => {
            section_table.remove(key);
        }
    }

    // Write atomically
    if let Some(parent) = settings.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let serialized = toml::to_string_pretty(&doc).map_err(io::Error::other)?;
    let tmp = settings.with_extension("toml.tmp");
    std::fs::write(&tmp, &serialized)?;
    std::fs::rename(&tmp, settings)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_then_load_round_trips_each_section() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("nested").join("settings.toml");

        save_path(&file, STORAGE_SECTION, DATABASE_KEY, Some(Path::new("/data/catalog.db")))
            .unwrap();
        save_path(&file, IMPORT_SECTION, ARCHIVE_DIR_KEY, Some(Path::new("/data/uploads")))
            .unwrap();

        assert_eq!(
            load_path(&file, STORAGE_SECTION, DATABASE_KEY),
            Some(PathBuf::from("/data/catalog.db"))
        );
        assert_eq!(
            load_path(&file, IMPORT_SECTION, ARCHIVE_DIR_KEY),
            Some(PathBuf::from("/data/uploads"))
        );
    }

    #[test]
    fn unrelated_keys_survive_updates() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("settings.toml");
        std::fs::write(&file, "[storage]\ndatabase = \"a.db\"\ntheme = \"dark\"\n").unwrap();

        save_path(&file, STORAGE_SECTION, DATABASE_KEY, Some(Path::new("b.db"))).unwrap();

        let contents = std::fs::read_to_string(&file).unwrap();
        assert!(contents.contains("theme = \"dark\""));
        assert_eq!(
            load_path(&file, STORAGE_SECTION, DATABASE_KEY),
            Some(PathBuf::from("b.db"))
        );
    }

    #[test]
    fn clearing_and_missing_values() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("settings.toml");
        assert_eq!(load_path(&file, STORAGE_SECTION, DATABASE_KEY), None);

        save_path(&file, STORAGE_SECTION, DATABASE_KEY, Some(Path::new("x.db"))).unwrap();
        save_path(&file, STORAGE_SECTION, DATABASE_KEY, None).unwrap();
        assert_eq!(load_path(&file, STORAGE_SECTION, DATABASE_KEY), None);
    }

    #[test]
    fn cli_override_wins() {
        assert_eq!(
            resolve_database_path(Some(PathBuf::from("/tmp/override.db"))),
            PathBuf::from("/tmp/override.db")
        );
        assert_eq!(
            resolve_archive_dir(Some(PathBuf::from("/tmp/uploads"))),
            PathBuf::from("/tmp/uploads")
        );
    }
}
