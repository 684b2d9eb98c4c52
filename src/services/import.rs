// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Import engine: staged files in, canonical documents out.
//!
//! Per kind the run moves through
//! `Scanning -> (Reading -> Normalizing -> Upserting)* -> Completed | Aborted`.
//!
//! Failure isolation:
//! - A record that fails validation, or whose upsert fails recoverably, is
//!   counted as failed and the run continues.
//! - A staged file that is not JSON fails as a whole (keyed by file stem).
//! - An unusable store connection or an unreadable staging area aborts the
//!   run, returning the tallies gathered so far.

use chrono::{NaiveDate, Utc};
use futures_util::future::join_all;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::db::{DocumentStore, StoreError};
use crate::models::{ImportReport, RecordKind, RunOutcome};
use crate::normalize::{is_empty_payload, normalize, split_payloads, ValidationFailure};
use crate::staging::{StagedFile, StagingError, StagingStore};
use crate::time_utils::{format_calendar_date, format_utc_rfc3339};

/// What to import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRequest {
    pub kinds: Vec<RecordKind>,
    /// Inclusive; records dated before it are skipped.
    pub start: Option<NaiveDate>,
    /// Inclusive; records dated after it are skipped.
    pub end: Option<NaiveDate>,
}

impl ImportRequest {
    pub fn all() -> Self {
        Self::kinds(RecordKind::ALL.to_vec())
    }

    pub fn kinds(kinds: Vec<RecordKind>) -> Self {
        Self {
            kinds,
            start: None,
            end: None,
        }
    }

    pub fn between(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    /// Whether a record dated `date` (`YYYY-MM-DD`) is inside the range.
    fn includes(&self, date: &str) -> bool {
        let after_start = self
            .start
            .is_none_or(|start| date >= format_calendar_date(start).as_str());
        let before_end = self
            .end
            .is_none_or(|end| date <= format_calendar_date(end).as_str());
        after_start && before_end
    }
}

/// Why a run stopped early.
#[derive(Debug, thiserror::Error)]
pub enum AbortCause {
    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("{0}")]
    Staging(#[from] StagingError),
}

/// A run that hit a fatal error. `report` holds the tallies up to that point.
#[derive(Debug, thiserror::Error)]
#[error(
    "{} imported, {} failed, run aborted: {cause}",
    .report.total_imported(),
    .report.total_failed()
)]
pub struct ImportAborted {
    pub report: ImportReport,
    #[source]
    pub cause: AbortCause,
}

/// Import run state, logged on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Scanning,
    Reading,
    Normalizing,
    Upserting,
    Completed,
    Aborted,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Idle => "idle",
            RunState::Scanning => "scanning",
            RunState::Reading => "reading",
            RunState::Normalizing => "normalizing",
            RunState::Upserting => "upserting",
            RunState::Completed => "completed",
            RunState::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// Outcome of one payload.
enum Step {
    Imported,
    Skipped,
}

/// Per-payload failure.
enum StepError {
    Invalid(ValidationFailure),
    Encode { key: String, reason: String },
    Store { key: String, error: StoreError },
}

/// Report of one kind plus the fatal error that ended it, if any.
struct KindRun {
    report: ImportReport,
    abort: Option<AbortCause>,
}

/// Reads staged files, normalizes, and upserts into a [`DocumentStore`].
pub struct ImportEngine<S> {
    store: S,
    staging: StagingStore,
    max_failure_samples: usize,
    parallel_kinds: bool,
}

impl<S: DocumentStore> ImportEngine<S> {
    pub fn new(store: S, staging: StagingStore) -> Self {
        Self {
            store,
            staging,
            max_failure_samples: 100,
            parallel_kinds: false,
        }
    }

    pub fn from_config(store: S, config: &Config) -> Self {
        Self::new(store, StagingStore::new(config.data_dir.clone()))
            .with_max_failure_samples(config.max_failure_samples)
            .with_parallel_kinds(config.parallel_kinds)
    }

    pub fn with_max_failure_samples(mut self, max: usize) -> Self {
        self.max_failure_samples = max;
        self
    }

    /// Import kinds concurrently instead of one after another.
    pub fn with_parallel_kinds(mut self, parallel: bool) -> Self {
        self.parallel_kinds = parallel;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run an import.
    ///
    /// Returns the report when every kind finished or the run was cancelled
    /// (`outcome` tells which), and `ImportAborted` on a fatal error.
    pub async fn run(
        &self,
        request: &ImportRequest,
        cancel: &CancellationToken,
    ) -> Result<ImportReport, Box<ImportAborted>> {
        let imported_at = format_utc_rfc3339(Utc::now());
        tracing::info!(
            state = %RunState::Idle,
            kinds = ?request.kinds,
            start = ?request.start,
            end = ?request.end,
            parallel = self.parallel_kinds,
            "Starting import"
        );

        let runs = if self.parallel_kinds {
            // A fatal error in one kind stops the others.
            let siblings = cancel.child_token();
            let runs = request.kinds.iter().map(|&kind| {
                let siblings = &siblings;
                let imported_at = &imported_at;
                async move {
                    let run = self.import_kind(kind, request, imported_at, siblings).await;
                    if run.abort.is_some() {
                        siblings.cancel();
                    }
                    run
                }
            });
            join_all(runs).await
        } else {
            let mut runs = Vec::with_capacity(request.kinds.len());
            for &kind in &request.kinds {
                let run = self.import_kind(kind, request, &imported_at, cancel).await;
                let fatal = run.abort.is_some();
                runs.push(run);
                if fatal {
                    break;
                }
            }
            runs
        };

        let mut report = ImportReport::new(self.max_failure_samples);
        let mut abort = None;
        for run in runs {
            report.merge(run.report);
            if abort.is_none() {
                abort = run.abort;
            }
        }

        match abort {
            Some(cause) => {
                let aborted = ImportAborted { report, cause };
                tracing::error!(state = %RunState::Aborted, error = %aborted, "Import aborted");
                Err(Box::new(aborted))
            }
            None => {
                tracing::info!(
                    state = %RunState::Completed,
                    outcome = ?report.outcome,
                    imported = report.total_imported(),
                    skipped = report.total_skipped(),
                    failed = report.total_failed(),
                    "Import finished"
                );
                Ok(report)
            }
        }
    }

    async fn import_kind(
        &self,
        kind: RecordKind,
        request: &ImportRequest,
        imported_at: &str,
        cancel: &CancellationToken,
    ) -> KindRun {
        let mut report = ImportReport::new(self.max_failure_samples);
        report.touch(kind);

        if cancel.is_cancelled() {
            report.outcome = RunOutcome::Cancelled;
            return KindRun {
                report,
                abort: None,
            };
        }

        tracing::info!(%kind, state = %RunState::Scanning, "Scanning staged files");

        if let Err(e) = self.store.ensure_index(kind).await {
            return abort_kind(kind, report, e.into());
        }

        let files = match self.staging.list(kind).await {
            Ok(files) => files,
            Err(e) => return abort_kind(kind, report, e.into()),
        };
        let superseded = superseded_summaries(kind, &files);

        'files: for file in &files {
            if cancel.is_cancelled() {
                report.outcome = RunOutcome::Cancelled;
                break;
            }

            if superseded.contains(file.key.as_str()) {
                tracing::debug!(%kind, file = %file.key, "Summary superseded by details file");
                report.record_skipped(kind);
                continue;
            }

            tracing::trace!(%kind, file = %file.key, state = %RunState::Reading);
            let content = match self.staging.read(file).await {
                Ok(content) => content,
                Err(e) if e.is_fatal() => return abort_kind(kind, report, e.into()),
                Err(e) => {
                    tracing::warn!(%kind, file = %file.key, error = %e, "Unreadable staged file");
                    report.record_failed(kind, file.key.clone(), e.to_string());
                    continue;
                }
            };

            for raw in split_payloads(kind, content) {
                if cancel.is_cancelled() {
                    report.outcome = RunOutcome::Cancelled;
                    break 'files;
                }

                match self.import_payload(kind, &raw, request, imported_at).await {
                    Ok(Step::Imported) => report.record_imported(kind),
                    Ok(Step::Skipped) => report.record_skipped(kind),
                    Err(StepError::Invalid(failure)) => {
                        tracing::warn!(
                            %kind,
                            key = %failure.natural_key,
                            missing = ?failure.missing,
                            file = %file.key,
                            "Rejected record"
                        );
                        report.record_failed(kind, failure.natural_key.clone(), failure.to_string());
                    }
                    Err(StepError::Encode { key, reason }) => {
                        tracing::warn!(%kind, key, error = %reason, "Could not encode record");
                        report.record_failed(kind, key, reason);
                    }
                    Err(StepError::Store { error, .. }) if error.is_fatal() => {
                        return abort_kind(kind, report, error.into());
                    }
                    Err(StepError::Store { key, error }) => {
                        tracing::warn!(%kind, key, error = %error, "Upsert failed");
                        report.record_failed(kind, key, error.to_string());
                    }
                }
            }
        }

        let tally = report.tally(kind);
        tracing::info!(
            %kind,
            state = %RunState::Completed,
            imported = tally.imported,
            skipped = tally.skipped,
            failed = tally.failed,
            cancelled = report.outcome == RunOutcome::Cancelled,
            "Kind finished"
        );
        KindRun {
            report,
            abort: None,
        }
    }

    async fn import_payload(
        &self,
        kind: RecordKind,
        raw: &Value,
        request: &ImportRequest,
        imported_at: &str,
    ) -> Result<Step, StepError> {
        tracing::trace!(%kind, state = %RunState::Normalizing);
        if is_empty_payload(kind, raw) {
            return Ok(Step::Skipped);
        }

        let record = normalize(kind, raw).map_err(StepError::Invalid)?;
        if !request.includes(record.record_date()) {
            return Ok(Step::Skipped);
        }

        let key = record.natural_key();
        let document = record
            .to_document(imported_at, raw)
            .map_err(|e| StepError::Encode {
                key: key.clone(),
                reason: e.to_string(),
            })?;

        tracing::trace!(%kind, key, state = %RunState::Upserting);
        self.store
            .upsert(kind, &key, &document)
            .await
            .map_err(|error| StepError::Store { key, error })?;
        Ok(Step::Imported)
    }
}

fn abort_kind(kind: RecordKind, report: ImportReport, cause: AbortCause) -> KindRun {
    tracing::error!(%kind, state = %RunState::Aborted, error = %cause, "Fatal error");
    KindRun {
        report,
        abort: Some(cause),
    }
}

/// Activity summary files whose details file is also staged. Details carry a
/// superset of the summary, so the summary is not imported.
fn superseded_summaries(kind: RecordKind, files: &[StagedFile]) -> HashSet<&str> {
    if kind != RecordKind::Activity {
        return HashSet::new();
    }
    let keys: HashSet<&str> = files.iter().map(|f| f.key.as_str()).collect();
    files
        .iter()
        .filter(|f| {
            f.key
                .strip_suffix("_summary")
                .is_some_and(|id| keys.contains(format!("{id}_details").as_str()))
        })
        .map(|f| f.key.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn staged(key: &str) -> StagedFile {
        StagedFile {
            kind: RecordKind::Activity,
            key: key.to_string(),
            path: PathBuf::from(format!("{key}.json")),
        }
    }

    #[test]
    fn test_superseded_summaries() {
        let files = vec![
            staged("42_details"),
            staged("42_summary"),
            staged("43_summary"),
            staged("44_details"),
        ];
        let superseded = superseded_summaries(RecordKind::Activity, &files);
        assert_eq!(superseded.len(), 1);
        assert!(superseded.contains("42_summary"));

        assert!(superseded_summaries(RecordKind::Sleep, &files).is_empty());
    }

    #[test]
    fn test_request_date_range() {
        let request = ImportRequest::all().between(
            NaiveDate::from_ymd_opt(2024, 1, 1),
            NaiveDate::from_ymd_opt(2024, 1, 31),
        );
        assert!(request.includes("2024-01-01"));
        assert!(request.includes("2024-01-31"));
        assert!(!request.includes("2023-12-31"));
        assert!(!request.includes("2024-02-01"));
        assert!(ImportRequest::all().includes("1999-01-01"));
    }

    #[test]
    fn test_aborted_display() {
        let mut report = ImportReport::new(10);
        report.record_imported(RecordKind::Sleep);
        report.record_imported(RecordKind::Sleep);
        report.record_failed(RecordKind::Sleep, "2024-01-03", "bad");
        let aborted = ImportAborted {
            report,
            cause: StoreError::Connection("lost".to_string()).into(),
        };
        assert_eq!(
            aborted.to_string(),
            "2 imported, 1 failed, run aborted: Store connection unusable: lost"
        );
    }
}
