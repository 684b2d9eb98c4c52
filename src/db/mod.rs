//! Document store layer.
//!
//! The import engine talks to the database only through [`DocumentStore`].
//! Two implementations: Firestore for real runs, and an in-memory store for
//! tests and dry runs.

pub mod aggregate;
pub mod firestore;
pub mod memory;

use serde_json::Value;
use std::future::Future;
use std::time::Duration;

use crate::models::RecordKind;

pub use aggregate::{AggregateOp, AggregateRow, AggregateSpec, GroupBy};
pub use firestore::FirestoreStore;
pub use memory::MemoryStore;

/// Collection names as constants.
pub mod collections {
    use crate::models::RecordKind;

    pub const DAILY_SUMMARY: &str = "daily_summary";
    pub const ACTIVITIES: &str = "activities";
    pub const SLEEP: &str = "sleep";
    pub const WEIGHT: &str = "weight";
    pub const RESTING_HEART_RATE: &str = "resting_heart_rate";

    pub fn for_kind(kind: RecordKind) -> &'static str {
        match kind {
            RecordKind::DailySummary => DAILY_SUMMARY,
            RecordKind::Activity => ACTIVITIES,
            RecordKind::Sleep => SLEEP,
            RecordKind::Weight => WEIGHT,
            RecordKind::RestingHeartRate => RESTING_HEART_RATE,
        }
    }
}

/// Store-level failure.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// The connection itself is unusable; an import run must abort.
    #[error("Store connection unusable: {0}")]
    Connection(String),

    #[error("Store operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Store operation failed: {0}")]
    Operation(String),
}

impl StoreError {
    /// Connection-level errors end the run; the rest are per-record.
    pub fn is_fatal(&self) -> bool {
        matches!(self, StoreError::Connection(_))
    }
}

/// Upper bound for inclusive string range queries: a bare `YYYY-MM-DD`
/// also covers datetimes later on that day.
pub fn inclusive_upper_bound(end: &str) -> String {
    format!("{end}\u{7f}")
}

/// CRUD/query interface over the external document database.
///
/// `upsert` must be safe to call concurrently for different keys. Writing
/// the same key twice replaces the first document.
pub trait DocumentStore: Send + Sync {
    /// Establish the unique natural-key index for `kind`. Idempotent.
    fn ensure_index(&self, kind: RecordKind)
        -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Insert or replace the document stored under `key`.
    fn upsert(
        &self,
        kind: RecordKind,
        key: &str,
        document: &Value,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Documents whose date field lies in `[start, end]`, oldest first.
    fn query_by_date_range(
        &self,
        kind: RecordKind,
        start: &str,
        end: &str,
    ) -> impl Future<Output = Result<Vec<Value>, StoreError>> + Send;

    /// Number of stored documents of `kind`.
    fn count(&self, kind: RecordKind) -> impl Future<Output = Result<u64, StoreError>> + Send;

    /// Group and reduce documents of `kind` as described by `spec`.
    fn aggregate(
        &self,
        kind: RecordKind,
        spec: &AggregateSpec,
    ) -> impl Future<Output = Result<Vec<AggregateRow>, StoreError>> + Send {
        async move {
            let (start, end) = spec.bounds();
            let documents = self.query_by_date_range(kind, &start, &end).await?;
            Ok(spec.apply(kind, &documents))
        }
    }
}
