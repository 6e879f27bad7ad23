//! cinevault CLI
//!
//! Command-line interface for importing and auditing a movie collection catalog.

mod cli_types;
mod commands;
mod error;
mod settings;

use std::io::Write;

use clap::Parser;

use cli_types::{Cli, Commands, ConfigAction};
pub(crate) use error::CliError;

fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose, cli.quiet);

    if let Err(e) = run(cli) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let quiet = cli.quiet;
    match cli.command {
        Commands::Import {
            path,
            archive_dir,
            no_archive,
            json,
        } => {
            let db_path = settings::resolve_database_path(cli.db);
            let archive_dir = if no_archive {
                None
            } else {
                Some(settings::resolve_archive_dir(archive_dir))
            };
            commands::import::run_import(&db_path, &path, archive_dir, json, quiet)
        }
        Commands::Audit { json } => {
            let db_path = settings::resolve_database_path(cli.db);
            commands::audit::run_audit(&db_path, json)
        }
        Commands::Stats { limit, json } => {
            let db_path = settings::resolve_database_path(cli.db);
            commands::stats::run_stats(&db_path, limit, json)
        }
        Commands::Show { id } => {
            let db_path = settings::resolve_database_path(cli.db);
            commands::show::run_show(&db_path, id)
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => {
                commands::config::run_config_show(cli.db.as_deref());
                Ok(())
            }
            ConfigAction::Path => {
                commands::config::run_config_path();
                Ok(())
            }
            ConfigAction::SetDatabase { path } => commands::config::run_config_set_database(&path),
            ConfigAction::SetArchiveDir { path } => {
                commands::config::run_config_set_archive_dir(&path)
            }
        },
    }
}

/// Install the logger. `RUST_LOG` overrides the level picked from the flags.
///
/// Normal output is bare messages so `log::info!` reads like `println!`;
/// verbose mode switches to timestamped, level-tagged lines.
fn init_logger(verbose: bool, quiet: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else if quiet {
        log::LevelFilter::Warn
    } else {
        log::LevelFilter::Info
    };

    let mut builder = env_logger::Builder::new();
    builder.filter_level(level).parse_default_env();

    if verbose {
        builder.format_timestamp_millis();
    } else {
        builder.format(|buf, record| match record.level() {
            log::Level::Error => writeln!(buf, "error: {}", record.args()),
            _ => writeln!(buf, "{}", record.args()),
        });
    }

    builder.init();
}
