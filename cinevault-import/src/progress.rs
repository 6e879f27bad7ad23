//! Import progress reporting.

use std::cell::Cell;

use crate::audit::AuditReport;
use crate::batch::ParentResolution;
use crate::stats::EntryOutcome;

/// Receives updates while an import runs.
pub trait ImportProgress {
    /// Called after each export entry, with what happened to it.
    fn on_entry(&self, current: usize, total: usize, title: &str, outcome: &EntryOutcome);

    /// Called when a phase starts (e.g., "Auditing box-set relationships").
    fn on_phase(&self, message: &str);

    /// Called once the audit has run, before the transaction commits.
    fn on_audit(&self, _report: &AuditReport) {}

    /// Called after the import has committed.
    fn on_complete(&self, message: &str);
}

/// Discards all updates.
pub struct SilentProgress;

impl ImportProgress for SilentProgress {
    fn on_entry(&self, _current: usize, _total: usize, _title: &str, _outcome: &EntryOutcome) {}
    fn on_phase(&self, _message: &str) {}
    fn on_complete(&self, _message: &str) {}
}

/// Logs progress through the `log` crate, with running box-set link counts.
#[derive(Debug, Default)]
pub struct LogProgress {
    imported: Cell<usize>,
    linked: Cell<usize>,
    unresolved: Cell<usize>,
    failed: Cell<usize>,
}

impl LogProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Running tally as `(imported, parents linked, parents unresolved, failed)`.
    pub fn tally(&self) -> (usize, usize, usize, usize) {
        (
            self.imported.get(),
            self.linked.get(),
            self.unresolved.get(),
            self.failed.get(),
        )
    }

    fn count(&self, outcome: &EntryOutcome) {
        let bump = |c: &Cell<usize>| c.set(c.get() + 1);
        match outcome {
            EntryOutcome::Imported { parent, .. } => {
                bump(&self.imported);
                match parent {
                    ParentResolution::Resolved { .. } => bump(&self.linked),
                    ParentResolution::Unresolved { .. } => bump(&self.unresolved),
                    ParentResolution::None => {}
                }
            }
            EntryOutcome::Failed { .. } => bump(&self.failed),
            EntryOutcome::Skipped(_) => {}
        }
    }
}

impl ImportProgress for LogProgress {
    fn on_entry(&self, current: usize, total: usize, title: &str, outcome: &EntryOutcome) {
        self.count(outcome);
        if current.is_multiple_of(250) || current == total {
            let (imported, linked, unresolved, failed) = self.tally();
            log::info!(
                "  [{}/{}] {} ({} imported, {} box-set links, {} unresolved, {} failed)",
                current,
                total,
                title,
                imported,
                linked,
                unresolved,
                failed,
            );
        }
    }

    fn on_phase(&self, message: &str) {
        log::info!("{}", message);
    }

    fn on_audit(&self, report: &AuditReport) {
        if report.is_clean() {
            log::info!("  Box-set relationships are consistent");
        } else {
            log::info!(
                "  Repaired {} dangling, {} cyclic, {} self-referencing parent links",
                report.dangling(),
                report.cycles(),
                report.self_references(),
            );
        }
    }

    fn on_complete(&self, message: &str) {
        log::info!("{}", message);
    }
}
