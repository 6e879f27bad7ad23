//! SQLite persistence layer for the movie catalog.
//!
//! Provides schema creation, create/read operations, and query APIs
//! backed by SQLite (via rusqlite with bundled feature).

pub mod operations;
pub mod queries;
pub mod schema;

pub use operations::{
    AppearanceWrite, OperationError, entry_exists, find_appearance, find_person, get_entry,
    insert_entry, insert_import_log, insert_person, set_parent, upsert_appearance,
};
pub use queries::{
    CastRow, CatalogStats, ParentLink, appearances_for_entry, catalog_stats, children_of,
    find_dangling_parents, find_parent_cycles, find_self_parents, list_entries,
    list_import_logs,
};
pub use schema::{SchemaError, open_database, open_memory};
