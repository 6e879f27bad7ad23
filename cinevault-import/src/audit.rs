//! Box-set relationship audit.
//!
//! Three sweeps over the whole catalog, in order: dangling parents, two-node
//! cycles, self references. Every repair clears a `parent_id` and nothing
//! else, so running the audit again changes nothing.

use std::collections::HashSet;
use std::fmt;

use cinevault_db::operations::{self, OperationError};
use cinevault_db::queries;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairKind {
    /// Parent reference to a row that does not exist.
    Dangling,
    /// Two entries naming each other as parent.
    Cycle,
    /// An entry naming itself as parent.
    SelfReference,
}

impl fmt::Display for RepairKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Dangling => "dangling parent",
            Self::Cycle => "parent cycle",
            Self::SelfReference => "self-referencing parent",
        })
    }
}

/// One cleared parent reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Repair {
    pub entry_id: i64,
    pub former_parent: i64,
    pub kind: RepairKind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    pub repairs: Vec<Repair>,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.repairs.is_empty()
    }

    pub fn dangling(&self) -> usize {
        self.count(RepairKind::Dangling)
    }

    pub fn cycles(&self) -> usize {
        self.count(RepairKind::Cycle)
    }

    pub fn self_references(&self) -> usize {
        self.count(RepairKind::SelfReference)
    }

    fn count(&self, kind: RepairKind) -> usize {
        self.repairs.iter().filter(|r| r.kind == kind).count()
    }

    fn clear(&mut self, tx: &Transaction<'_>, repair: Repair) -> Result<(), OperationError> {
        operations::set_parent(tx, repair.entry_id, None)?;
        log::info!(
            "Cleared {} on entry {} (was {})",
            repair.kind,
            repair.entry_id,
            repair.former_parent,
        );
        self.repairs.push(repair);
        Ok(())
    }
}

/// Detect and repair broken parent references inside `tx`.
pub fn audit_relationships(tx: &Transaction<'_>) -> Result<AuditReport, OperationError> {
    let mut report = AuditReport::default();

    for link in queries::find_dangling_parents(tx)? {
        report.clear(
            tx,
            Repair {
                entry_id: link.entry_id,
                former_parent: link.parent_id,
                kind: RepairKind::Dangling,
            },
        )?;
    }

    // Each cycle is reported from both sides; the lower id comes first and
    // is the one cleared.
    let mut broken: HashSet<i64> = HashSet::new();
    for link in queries::find_parent_cycles(tx)? {
        if broken.contains(&link.entry_id) || broken.contains(&link.parent_id) {
            continue;
        }
        report.clear(
            tx,
            Repair {
                entry_id: link.entry_id,
                former_parent: link.parent_id,
                kind: RepairKind::Cycle,
            },
        )?;
        broken.insert(link.entry_id);
    }

    for link in queries::find_self_parents(tx)? {
        report.clear(
            tx,
            Repair {
                entry_id: link.entry_id,
                former_parent: link.parent_id,
                kind: RepairKind::SelfReference,
            },
        )?;
    }

    if report.is_clean() {
        log::debug!("Relationship audit found nothing to repair");
    }
    Ok(report)
}

/// Run the audit on its own in a dedicated write transaction.
pub fn audit_catalog(conn: &Connection) -> Result<AuditReport, OperationError> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    let report = audit_relationships(&tx)?;
    tx.commit()?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repair(entry_id: i64, kind: RepairKind) -> Repair {
        Repair {
            entry_id,
            former_parent: 0,
            kind,
        }
    }

    #[test]
    fn report_counts_by_kind() {
        let report = AuditReport {
            repairs: vec![
                repair(1, RepairKind::Dangling),
                repair(2, RepairKind::Dangling),
                repair(3, RepairKind::Cycle),
                repair(4, RepairKind::SelfReference),
            ],
        };
        assert_eq!(report.dangling(), 2);
        assert_eq!(report.cycles(), 1);
        assert_eq!(report.self_references(), 1);
        assert!(!report.is_clean());
        assert!(AuditReport::default().is_clean());
    }
}
