//! Data model types for the movie catalog.
//!
//! These types represent the persistent catalog schema: catalog entries,
//! persons, appearances, and import tracking.

use serde::{Deserialize, Serialize};

// ── Catalog Entry ───────────────────────────────────────────────────────────

/// A movie, show, or box set in the collection.
///
/// `id` is assigned by the source document, not generated by the database.
/// `parent_id` links a box-set child to its box set and is only guaranteed to
/// point at an existing, distinct row after an integrity audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: i64,
    pub external_id: Option<String>,
    pub title: String,
    pub release_year: Option<i32>,
    /// Free text; multiple source genres are joined with `", "`.
    pub genre: Option<String>,
    /// Runtime in minutes.
    pub runtime: Option<i32>,
    pub age_rating: Option<u8>,
    pub overview: Option<String>,
    pub collection_kind: Option<CollectionKind>,
    pub parent_id: Option<i64>,
    pub created_at: String,
}

/// Where an entry sits in the collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    Owned,
    Series,
    Stream,
    /// Any other label carried over verbatim from the source.
    Other(String),
}

impl CollectionKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Owned => "owned",
            Self::Series => "series",
            Self::Stream => "stream",
            Self::Other(s) => s.as_str(),
        }
    }

    pub fn from_str_loose(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "owned" => Self::Owned,
            "series" => Self::Series,
            "stream" | "streaming" => Self::Stream,
            _ => Self::Other(s.trim().to_string()),
        }
    }
}

// ── Person ──────────────────────────────────────────────────────────────────

/// A cast or crew member. `(first_name, last_name)` is the lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
}

impl Person {
    /// Display name, e.g. "Harrison Ford".
    pub fn full_name(&self) -> String {
        if self.last_name.is_empty() {
            self.first_name.clone()
        } else if self.first_name.is_empty() {
            self.last_name.clone()
        } else {
            format!("{} {}", self.first_name, self.last_name)
        }
    }
}

// ── Appearance ──────────────────────────────────────────────────────────────

/// Links a person to a catalog entry. Unique per `(entry_id, person_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appearance {
    pub entry_id: i64,
    pub person_id: i64,
    /// Character or crew role, e.g. "Indiana Jones" or "Director".
    pub role: Option<String>,
    /// Billing order; lower numbers are the main roles.
    pub sort_order: i64,
}

// ── Import Tracking ─────────────────────────────────────────────────────────

/// Log entry for a committed import run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportLog {
    pub id: i64,
    pub source_name: String,
    pub imported_at: String,
    pub entries_imported: i64,
    pub entries_skipped: i64,
    pub entries_failed: i64,
    pub persons_created: i64,
    pub appearances_created: i64,
    pub relations_repaired: i64,
}
