//! Run reports and per-phase tallies.
//!
//! Tallies are carried in an explicit report value threaded through the
//! run rather than ambient counters; each phase appends its own entry.

use serde::Serialize;

/// Which remediation phase produced a tally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Permanent deletion of trash contents.
    TrashPurge,
    /// Permanent deletion from monitored folders, bypassing trash.
    FolderPurge,
    /// Soft eviction: moving folder contents into the trash.
    TrashMove,
}

/// Tally for one executed remediation phase.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseReport {
    pub phase: Phase,
    /// Bytes this phase needed to free.
    pub deficit: i64,
    pub units_deleted: i32,
    pub units_blocked: i32,
    pub units_failed: i32,
    pub bytes_freed: i64,
    /// Labels of every unit deleted, in attempt order.
    pub deleted: Vec<String>,
}

impl PhaseReport {
    pub fn new(phase: Phase, deficit: i64) -> Self {
        Self {
            phase,
            deficit,
            units_deleted: 0,
            units_blocked: 0,
            units_failed: 0,
            bytes_freed: 0,
            deleted: Vec::new(),
        }
    }

    /// Whether the phase freed at least its deficit.
    pub fn covered(&self) -> bool {
        self.bytes_freed >= self.deficit
    }

    /// Units this phase touched, successfully or not.
    pub fn units_attempted(&self) -> i32 {
        self.units_deleted + self.units_blocked + self.units_failed
    }
}

/// Terminal state of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// No threshold was breached; nothing was attempted.
    NoOp,
    /// Every triggered deficit was covered.
    Complete,
    /// A phase ran out of candidates before covering its deficit.
    Partial,
}

/// Report returned after a janitor run completes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub dry_run: bool,
    pub phases: Vec<PhaseReport>,
}

impl RunReport {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            phases: Vec::new(),
        }
    }

    /// Terminal state. Phases run in sequence and each later phase's
    /// deficit already accounts for what earlier phases freed, so the run
    /// is complete exactly when its final phase covered its deficit.
    pub fn outcome(&self) -> RunOutcome {
        match self.phases.last() {
            None => RunOutcome::NoOp,
            Some(phase) if phase.covered() => RunOutcome::Complete,
            Some(_) => RunOutcome::Partial,
        }
    }

    pub fn total_bytes_freed(&self) -> i64 {
        self.phases.iter().map(|p| p.bytes_freed).sum()
    }

    pub fn total_units_deleted(&self) -> i32 {
        self.phases.iter().map(|p| p.units_deleted).sum()
    }

    /// Labels of every deleted unit across phases, in attempt order.
    pub fn deleted_labels(&self) -> impl Iterator<Item = &str> {
        self.phases
            .iter()
            .flat_map(|p| p.deleted.iter().map(String::as_str))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn phase(kind: Phase, deficit: i64, freed: i64) -> PhaseReport {
        PhaseReport {
            bytes_freed: freed,
            units_deleted: i32::from(freed > 0),
            ..PhaseReport::new(kind, deficit)
        }
    }

    #[test]
    fn empty_report_is_noop() {
        assert_eq!(RunReport::new(false).outcome(), RunOutcome::NoOp);
    }

    #[test]
    fn covered_final_phase_is_complete() {
        let mut report = RunReport::new(false);
        report.phases.push(phase(Phase::TrashPurge, 100, 40));
        report.phases.push(phase(Phase::FolderPurge, 60, 80));
        assert_eq!(report.outcome(), RunOutcome::Complete);
        assert_eq!(report.total_bytes_freed(), 120);
    }

    #[test]
    fn uncovered_final_phase_is_partial() {
        let mut report = RunReport::new(false);
        report.phases.push(phase(Phase::TrashMove, 100, 30));
        assert_eq!(report.outcome(), RunOutcome::Partial);
    }

    #[test]
    fn overshoot_counts_as_covered() {
        let p = phase(Phase::TrashMove, 100, 150);
        assert!(p.covered());
    }

    #[test]
    fn serializes_with_snake_case_phases() {
        let mut report = RunReport::new(true);
        report.phases.push(phase(Phase::TrashPurge, 10, 10));
        let json = serde_json::to_value(&report).expect("report is always serialisable");
        assert_eq!(json["dry_run"], true);
        assert_eq!(json["phases"][0]["phase"], "trash_purge");
    }
}
