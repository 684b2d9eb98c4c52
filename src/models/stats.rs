//! Import run tallies.
//!
//! Every run reports per-kind counts plus a bounded sample of the records
//! that failed, so a large backfill with many rejects keeps memory flat.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::models::RecordKind;

/// Counts for one kind within a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KindTally {
    pub imported: u64,
    pub skipped: u64,
    pub failed: u64,
}

impl KindTally {
    pub fn new(imported: u64, skipped: u64, failed: u64) -> Self {
        Self {
            imported,
            skipped,
            failed,
        }
    }

    fn absorb(&mut self, other: KindTally) {
        self.imported += other.imported;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}

/// A record that could not be imported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureSample {
    pub kind: RecordKind,
    pub natural_key: String,
    pub reason: String,
}

/// How a run that returned a report ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum RunOutcome {
    #[default]
    Completed,
    /// Stopped by the caller; tallies cover the files processed so far.
    Cancelled,
}

/// Result of an import run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    pub tallies: BTreeMap<RecordKind, KindTally>,
    pub failures: Vec<FailureSample>,
    /// Failures not kept in `failures` because the sample was full.
    pub failures_dropped: u64,
    pub outcome: RunOutcome,
    #[serde(skip)]
    max_failure_samples: usize,
}

impl ImportReport {
    pub fn new(max_failure_samples: usize) -> Self {
        Self {
            max_failure_samples,
            ..Self::default()
        }
    }

    /// Tally for `kind` (zeroes if the kind was never touched).
    pub fn tally(&self, kind: RecordKind) -> KindTally {
        self.tallies.get(&kind).copied().unwrap_or_default()
    }

    /// Make sure `kind` shows up in the report even with nothing to import.
    pub fn touch(&mut self, kind: RecordKind) {
        self.tallies.entry(kind).or_default();
    }

    pub fn record_imported(&mut self, kind: RecordKind) {
        self.tallies.entry(kind).or_default().imported += 1;
    }

    pub fn record_skipped(&mut self, kind: RecordKind) {
        self.tallies.entry(kind).or_default().skipped += 1;
    }

    pub fn record_failed(
        &mut self,
        kind: RecordKind,
        natural_key: impl Into<String>,
        reason: impl Into<String>,
    ) {
        self.tallies.entry(kind).or_default().failed += 1;
        self.push_sample(FailureSample {
            kind,
            natural_key: natural_key.into(),
            reason: reason.into(),
        });
    }

    fn push_sample(&mut self, sample: FailureSample) {
        if self.failures.len() < self.max_failure_samples {
            self.failures.push(sample);
        } else {
            self.failures_dropped += 1;
        }
    }

    /// Fold a per-kind report (from a concurrent worker) into this one.
    pub fn merge(&mut self, other: ImportReport) {
        for (kind, tally) in other.tallies {
            self.tallies.entry(kind).or_default().absorb(tally);
        }
        for sample in other.failures {
            self.push_sample(sample);
        }
        self.failures_dropped += other.failures_dropped;
        if other.outcome == RunOutcome::Cancelled {
            self.outcome = RunOutcome::Cancelled;
        }
    }

    pub fn total_imported(&self) -> u64 {
        self.tallies.values().map(|t| t.imported).sum()
    }

    pub fn total_skipped(&self) -> u64 {
        self.tallies.values().map(|t| t.skipped).sum()
    }

    pub fn total_failed(&self) -> u64 {
        self.tallies.values().map(|t| t.failed).sum()
    }
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} imported, {} skipped, {} failed",
            self.total_imported(),
            self.total_skipped(),
            self.total_failed()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_counts_per_kind() {
        let mut report = ImportReport::new(10);
        report.record_imported(RecordKind::Activity);
        report.record_imported(RecordKind::Activity);
        report.record_skipped(RecordKind::Sleep);
        report.record_failed(RecordKind::Activity, "42", "missing: distance");

        assert_eq!(report.tally(RecordKind::Activity), KindTally::new(2, 0, 1));
        assert_eq!(report.tally(RecordKind::Sleep), KindTally::new(0, 1, 0));
        assert_eq!(report.tally(RecordKind::Weight), KindTally::default());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.to_string(), "2 imported, 1 skipped, 1 failed");
    }

    #[test]
    fn test_failure_samples_are_bounded() {
        let mut report = ImportReport::new(2);
        for i in 0..5 {
            report.record_failed(RecordKind::Weight, i.to_string(), "bad");
        }

        assert_eq!(report.tally(RecordKind::Weight).failed, 5);
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.failures_dropped, 3);
    }

    #[test]
    fn test_merge_adds_tallies_and_keeps_bound() {
        let mut total = ImportReport::new(1);
        let mut a = ImportReport::new(1);
        a.record_imported(RecordKind::Activity);
        a.record_failed(RecordKind::Activity, "1", "bad");
        let mut b = ImportReport::new(1);
        b.record_imported(RecordKind::Sleep);
        b.record_failed(RecordKind::Sleep, "2024-01-01", "bad");
        b.outcome = RunOutcome::Cancelled;

        total.merge(a);
        total.merge(b);

        assert_eq!(total.total_imported(), 2);
        assert_eq!(total.total_failed(), 2);
        assert_eq!(total.failures.len(), 1);
        assert_eq!(total.failures_dropped, 1);
        assert_eq!(total.outcome, RunOutcome::Cancelled);
    }
}
