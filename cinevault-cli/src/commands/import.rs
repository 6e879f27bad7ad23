use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use cinevault_import::{EntryOutcome, ImportOptions, ImportProgress, import_file};

use crate::CliError;

use super::open_catalog;

/// Import one collection export into the catalog database.
pub(crate) fn run_import(
    db_path: &Path,
    path: &Path,
    archive_dir: Option<PathBuf>,
    json: bool,
    quiet: bool,
) -> Result<(), CliError> {
    if !path.is_file() {
        return Err(CliError::config(format!(
            "Export file not found: {}",
            path.display()
        )));
    }

    let conn = open_catalog(db_path)?;

    log::info!(
        "{}",
        format!("Importing {} into {}", path.display(), db_path.display())
            .if_supports_color(Stdout, |t| t.bold()),
    );

    let options = ImportOptions {
        source_name: String::new(),
        archive_dir,
    };
    let progress = CliImportProgress::new(quiet || json);
    let report = import_file(&conn, path, &options, Some(&progress)).inspect_err(|_| {
        progress.bar.abandon();
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    log::info!(
        "{} {}",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        "Import complete".if_supports_color(Stdout, |t| t.bold()),
    );
    for line in report.summary.lines() {
        log::info!("  {}", line);
    }
    for repair in &report.audit.repairs {
        log::info!(
            "  {} entry {}: {} {} cleared",
            "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
            repair.entry_id,
            repair.kind,
            repair.former_parent,
        );
    }
    if let Some(archived) = &report.archived_to {
        log::info!(
            "  Upload archived to {}",
            archived.display().if_supports_color(Stdout, |t| t.dimmed()),
        );
    }

    Ok(())
}

/// Progress bar over the entries of one import.
struct CliImportProgress {
    bar: ProgressBar,
}

impl CliImportProgress {
    fn new(hidden: bool) -> Self {
        let bar = if hidden {
            ProgressBar::hidden()
        } else {
            let style = ProgressStyle::with_template(
                "  {bar:30.cyan/blue} {pos}/{len} {wide_msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar());
            let bar = ProgressBar::new(0);
            bar.set_style(style);
            bar
        };
        Self { bar }
    }
}

impl ImportProgress for CliImportProgress {
    fn on_entry(&self, current: usize, total: usize, title: &str, outcome: &EntryOutcome) {
        if let EntryOutcome::Failed { id, reason, .. } = outcome {
            self.bar.println(format!(
                "  {} {} ({}): {}",
                "failed".if_supports_color(Stdout, |t| t.red()),
                title,
                id,
                reason
            ));
        }
        self.bar.set_length(total as u64);
        self.bar.set_position(current as u64);
        self.bar.set_message(title.to_string());
    }

    fn on_phase(&self, message: &str) {
        self.bar.println(format!(
            "  {}",
            message.if_supports_color(Stdout, |t| t.dimmed())
        ));
    }

    fn on_complete(&self, message: &str) {
        self.bar.finish_and_clear();
        log::debug!("{}", message);
    }
}
