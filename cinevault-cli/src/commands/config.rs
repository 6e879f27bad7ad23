use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::CliError;
use crate::settings;

/// Show the settings file and the paths it resolves to.
pub(crate) fn run_config_show(db_override: Option<&Path>) {
    let path = settings::settings_path();

    log::info!(
        "{}",
        "cinevault Configuration".if_supports_color(Stdout, |t| t.bold()),
    );
    log::info!("");

    if path.exists() {
        log::info!(
            "  Settings file: {} {}",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
            "(exists)".if_supports_color(Stdout, |t| t.green()),
        );
    } else {
        log::info!(
            "  Settings file: {} {}",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
            "(not found)".if_supports_color(Stdout, |t| t.dimmed()),
        );
    }

    let database = settings::resolve_database_path(db_override.map(Path::to_path_buf));
    let archive_dir = settings::resolve_archive_dir(None);
    log::info!("  Database:      {}", database.display());
    log::info!("  Archive dir:   {}", archive_dir.display());

    if let Some(contents) = settings::load_settings_string() {
        log::info!("");
        for line in contents.lines() {
            log::info!("  {}", line.if_supports_color(Stdout, |t| t.dimmed()));
        }
    }
}

/// Print the settings file path.
pub(crate) fn run_config_path() {
    println!("{}", settings::settings_path().display());
}

pub(crate) fn run_config_set_database(path: &Path) -> Result<(), CliError> {
    let path = absolute(path)?;
    settings::save_database_path(&path)
        .map_err(|e| CliError::config(format!("Failed to save settings: {}", e)))?;
    log::info!(
        "{} Database set to {}",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        path.display().if_supports_color(Stdout, |t| t.cyan()),
    );
    Ok(())
}

pub(crate) fn run_config_set_archive_dir(path: &Path) -> Result<(), CliError> {
    let path = absolute(path)?;
    settings::save_archive_dir(&path)
        .map_err(|e| CliError::config(format!("Failed to save settings: {}", e)))?;
    log::info!(
        "{} Archive directory set to {}",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        path.display().if_supports_color(Stdout, |t| t.cyan()),
    );
    Ok(())
}

fn absolute(path: &Path) -> Result<std::path::PathBuf, CliError> {
    Ok(std::path::absolute(path)?)
}
