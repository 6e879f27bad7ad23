//! CLI type definitions: command enums and argument structs.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "cinevault")]
#[command(about = "Import and audit a movie collection catalog", long_about = None)]
pub(crate) struct Cli {
    /// Catalog database (defaults to the configured or standard location)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Only show warnings and errors (suppress normal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose/debug logging (timestamps + debug-level messages)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Import a collection export (XML or a zip holding one XML file)
    Import {
        /// Export file to import
        path: PathBuf,

        /// Directory where a copy of the upload is archived
        #[arg(long)]
        archive_dir: Option<PathBuf>,

        /// Do not archive a copy of the upload
        #[arg(long, conflicts_with = "archive_dir")]
        no_archive: bool,

        /// Print the import report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Find and repair broken box-set relationships
    Audit {
        /// Print the repairs as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show catalog statistics and recent imports
    Stats {
        /// Number of recent imports to list
        #[arg(long, default_value_t = 10)]
        limit: u32,

        /// Print statistics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one catalog entry with its box-set children and cast
    Show {
        /// Internal key of the entry
        id: i64,
    },

    /// Manage the settings file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Show current settings and resolved paths
    Show,

    /// Print the settings file path
    Path,

    /// Save the default catalog database path
    SetDatabase {
        path: PathBuf,
    },

    /// Save the default upload archive directory
    SetArchiveDir {
        path: PathBuf,
    },
}
