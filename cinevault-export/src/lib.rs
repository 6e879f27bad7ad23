//! Loader for collection exports.
//!
//! Resolves an uploaded payload (raw XML or a single-document zip archive)
//! to an [`ExportDocument`] whose repeating elements are always lists.

pub mod archive;
pub mod document;
pub mod error;

pub use archive::{PayloadKind, extract_single_document, load_path, load_payload};
pub use document::{
    ENTRY_ELEMENT, ExportDocument, ExportEntry, ExportPerson, PersonKind, ROOT_ELEMENT,
    parse_document,
};
pub use error::ExportError;
