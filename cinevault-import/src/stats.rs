//! Per-entry outcomes and the statistics aggregated from them.

use std::fmt::Write as _;

use serde::Serialize;

use crate::audit::AuditReport;
use crate::batch::ParentResolution;
use crate::people::LinkStats;

/// Result of importing a single export entry.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryOutcome {
    Imported {
        id: i64,
        parent: ParentResolution,
        /// `None` when cast/crew linking failed and was rolled back.
        people: Option<LinkStats>,
    },
    Skipped(SkipReason),
    Failed {
        id: i64,
        title: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The internal key is missing or not positive.
    InvalidKey,
    /// A row with the internal key already exists.
    Duplicate,
}

/// Counters for one import call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportStatistics {
    pub entries_seen: u64,
    pub imported: u64,
    pub skipped_duplicates: u64,
    pub invalid_keys: u64,
    pub failed: u64,
    pub parents_linked: u64,
    pub unresolved_parents: u64,
    pub persons_created: u64,
    pub appearances_created: u64,
    pub appearances_updated: u64,
    pub person_link_failures: u64,
    pub dangling_repaired: u64,
    pub cycles_repaired: u64,
    pub self_references_repaired: u64,
}

impl ImportStatistics {
    /// Fold one entry outcome into the counters.
    pub fn record(&mut self, outcome: &EntryOutcome) {
        self.entries_seen += 1;
        match outcome {
            EntryOutcome::Imported { parent, people, .. } => {
                self.imported += 1;
                match parent {
                    ParentResolution::Resolved { .. } => self.parents_linked += 1,
                    ParentResolution::Unresolved { .. } => self.unresolved_parents += 1,
                    ParentResolution::None => {}
                }
                match people {
                    Some(linked) => {
                        self.persons_created += linked.persons_created;
                        self.appearances_created += linked.appearances_created;
                        self.appearances_updated += linked.appearances_updated;
                    }
                    None => self.person_link_failures += 1,
                }
            }
            EntryOutcome::Skipped(SkipReason::Duplicate) => self.skipped_duplicates += 1,
            EntryOutcome::Skipped(SkipReason::InvalidKey) => self.invalid_keys += 1,
            EntryOutcome::Failed { .. } => self.failed += 1,
        }
    }

    /// Add the repairs made by the integrity audit.
    pub fn record_audit(&mut self, report: &AuditReport) {
        self.dangling_repaired += report.dangling() as u64;
        self.cycles_repaired += report.cycles() as u64;
        self.self_references_repaired += report.self_references() as u64;
    }

    pub fn relations_repaired(&self) -> u64 {
        self.dangling_repaired + self.cycles_repaired + self.self_references_repaired
    }

    /// Render a human-readable multi-line summary.
    pub fn render_summary(&self) -> String {
        let mut out = String::new();
        // Writing to a String cannot fail.
        let _ = writeln!(out, "Entries processed: {}", self.entries_seen);
        let _ = writeln!(out, "  Imported: {}", self.imported);
        let _ = writeln!(out, "  Skipped (already in catalog): {}", self.skipped_duplicates);
        let _ = writeln!(out, "  Skipped (missing or invalid key): {}", self.invalid_keys);
        let _ = writeln!(out, "  Failed: {}", self.failed);
        let _ = writeln!(
            out,
            "Box-set links: {} ({} unresolved)",
            self.parents_linked, self.unresolved_parents
        );
        let _ = writeln!(out, "Persons created: {}", self.persons_created);
        let _ = writeln!(
            out,
            "Appearances: {} created, {} updated",
            self.appearances_created, self.appearances_updated
        );
        if self.person_link_failures > 0 {
            let _ = writeln!(
                out,
                "Cast/crew linking failed for {} entries",
                self.person_link_failures
            );
        }
        let _ = write!(
            out,
            "Relationships repaired: {} ({} dangling, {} cyclic, {} self-referencing)",
            self.relations_repaired(),
            self.dangling_repaired,
            self.cycles_repaired,
            self.self_references_repaired,
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_counts_each_outcome_kind() {
        let mut stats = ImportStatistics::default();
        stats.record(&EntryOutcome::Imported {
            id: 1,
            parent: ParentResolution::Resolved {
                parent_external_id: "box".to_string(),
                key: 10,
            },
            people: Some(LinkStats {
                persons_created: 2,
                appearances_created: 3,
                appearances_updated: 1,
            }),
        });
        stats.record(&EntryOutcome::Imported {
            id: 2,
            parent: ParentResolution::Unresolved {
                parent_external_id: "gone".to_string(),
            },
            people: None,
        });
        stats.record(&EntryOutcome::Skipped(SkipReason::Duplicate));
        stats.record(&EntryOutcome::Skipped(SkipReason::InvalidKey));
        stats.record(&EntryOutcome::Failed {
            id: 5,
            title: "Broken".to_string(),
            reason: "constraint".to_string(),
        });

        assert_eq!(stats.entries_seen, 5);
        assert_eq!(stats.imported, 2);
        assert_eq!(stats.skipped_duplicates, 1);
        assert_eq!(stats.invalid_keys, 1);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.parents_linked, 1);
        assert_eq!(stats.unresolved_parents, 1);
        assert_eq!(stats.persons_created, 2);
        assert_eq!(stats.appearances_created, 3);
        assert_eq!(stats.appearances_updated, 1);
        assert_eq!(stats.person_link_failures, 1);
    }

    #[test]
    fn summary_mentions_every_category() {
        let stats = ImportStatistics {
            entries_seen: 4,
            imported: 2,
            skipped_duplicates: 1,
            invalid_keys: 1,
            dangling_repaired: 1,
            ..Default::default()
        };
        let summary = stats.render_summary();
        assert!(summary.contains("Entries processed: 4"));
        assert!(summary.contains("Imported: 2"));
        assert!(summary.contains("Skipped (already in catalog): 1"));
        assert!(summary.contains("Skipped (missing or invalid key): 1"));
        assert!(summary.contains("Relationships repaired: 1 (1 dangling, 0 cyclic, 0 self-referencing)"));
        assert!(!summary.contains("linking failed"));
    }
}
