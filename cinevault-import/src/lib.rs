//! Import collection exports into the catalog database.
//!
//! An import resolves box-set relations from external identifiers, creates
//! new catalog entries, deduplicates cast and crew, and finishes with an
//! audit that repairs broken parent references. Everything runs inside one
//! write transaction.

pub mod audit;
pub mod batch;
pub mod coordinator;
pub mod entity;
pub mod people;
pub mod progress;
pub mod stats;

pub use audit::{AuditReport, Repair, RepairKind, audit_catalog, audit_relationships};
pub use batch::{ImportBatch, ParentResolution, RelationGroup};
pub use coordinator::{
    ImportError, ImportOptions, ImportReport, archive_payload, import_document, import_file,
    import_payload,
};
pub use entity::{import_entry, parse_age_rating};
pub use people::{LinkStats, link_people, split_name};
pub use progress::{ImportProgress, LogProgress, SilentProgress};
pub use stats::{EntryOutcome, ImportStatistics, SkipReason};
