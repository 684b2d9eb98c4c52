//! In-process [`DocumentStore`] for tests and dry runs.
//!
//! Supports fault injection: it can be told to drop its "connection" after a
//! number of writes, or to reject specific keys.

use dashmap::{DashMap, DashSet};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crate::db::{inclusive_upper_bound, DocumentStore, StoreError};
use crate::models::RecordKind;

#[derive(Default)]
struct Inner {
    documents: DashMap<(RecordKind, String), Value>,
    indexes: DashSet<RecordKind>,
    offline: AtomicBool,
    /// Upserts still allowed before the store goes offline (`u64::MAX`: no limit).
    writes_left: AtomicU64,
    rejected: DashSet<(RecordKind, String)>,
    upserts: AtomicU64,
}

/// Shared handle; clones see the same data.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        let inner = Inner {
            writes_left: AtomicU64::new(u64::MAX),
            ..Default::default()
        };
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Simulate losing (or regaining) the database connection.
    pub fn set_offline(&self, offline: bool) {
        self.inner.offline.store(offline, Ordering::SeqCst);
    }

    /// Go offline once `writes` more upserts have succeeded.
    pub fn disconnect_after(&self, writes: u64) {
        self.inner.writes_left.store(writes, Ordering::SeqCst);
    }

    /// Make every upsert of `key` fail with a recoverable error.
    pub fn reject_key(&self, kind: RecordKind, key: &str) {
        self.inner.rejected.insert((kind, key.to_string()));
    }

    pub fn get(&self, kind: RecordKind, key: &str) -> Option<Value> {
        self.inner
            .documents
            .get(&(kind, key.to_string()))
            .map(|doc| doc.value().clone())
    }

    pub fn has_index(&self, kind: RecordKind) -> bool {
        self.inner.indexes.contains(&kind)
    }

    /// Total upsert calls that reached storage.
    pub fn upsert_calls(&self) -> u64 {
        self.inner.upserts.load(Ordering::SeqCst)
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.inner.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Connection(
                "Database not connected (offline mode)".to_string(),
            ));
        }
        Ok(())
    }

    /// Consume one write from the budget, going offline when it runs out.
    fn take_write(&self) -> Result<(), StoreError> {
        let taken = self
            .inner
            .writes_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| match left {
                u64::MAX => Some(u64::MAX),
                0 => None,
                n => Some(n - 1),
            });
        if taken.is_err() {
            self.set_offline(true);
            return self.check_online();
        }
        Ok(())
    }
}

impl DocumentStore for MemoryStore {
    async fn ensure_index(&self, kind: RecordKind) -> Result<(), StoreError> {
        self.check_online()?;
        if self.inner.indexes.insert(kind) {
            tracing::debug!(%kind, key_field = kind.key_field(), "Created natural key index");
        }
        Ok(())
    }

    async fn upsert(&self, kind: RecordKind, key: &str, document: &Value) -> Result<(), StoreError> {
        self.check_online()?;
        self.take_write()?;
        if self.inner.rejected.contains(&(kind, key.to_string())) {
            return Err(StoreError::Operation(format!("write rejected for {key}")));
        }
        self.inner.upserts.fetch_add(1, Ordering::SeqCst);
        self.inner
            .documents
            .insert((kind, key.to_string()), document.clone());
        Ok(())
    }

    async fn query_by_date_range(
        &self,
        kind: RecordKind,
        start: &str,
        end: &str,
    ) -> Result<Vec<Value>, StoreError> {
        self.check_online()?;
        let field = kind.date_field();
        let upper = inclusive_upper_bound(end);

        let mut matches: Vec<(String, Value)> = self
            .inner
            .documents
            .iter()
            .filter(|entry| entry.key().0 == kind)
            .filter_map(|entry| {
                let date = entry.value().get(field)?.as_str()?.to_string();
                (date.as_str() >= start && date <= upper).then(|| (date, entry.value().clone()))
            })
            .collect();
        matches.sort_by(|a, b| a.0.cmp(&b.0));

        Ok(matches.into_iter().map(|(_, doc)| doc).collect())
    }

    async fn count(&self, kind: RecordKind) -> Result<u64, StoreError> {
        self.check_online()?;
        Ok(self
            .inner
            .documents
            .iter()
            .filter(|entry| entry.key().0 == kind)
            .count() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{AggregateOp, AggregateSpec, GroupBy};
    use serde_json::json;

    #[tokio::test]
    async fn test_upsert_replaces_same_key() {
        let store = MemoryStore::new();
        store
            .upsert(RecordKind::Weight, "2024-01-01", &json!({"date": "2024-01-01", "weight": 80.0}))
            .await
            .unwrap();
        store
            .upsert(RecordKind::Weight, "2024-01-01", &json!({"date": "2024-01-01", "weight": 79.5}))
            .await
            .unwrap();

        assert_eq!(store.count(RecordKind::Weight).await.unwrap(), 1);
        assert_eq!(
            store.get(RecordKind::Weight, "2024-01-01").unwrap()["weight"],
            json!(79.5)
        );
    }

    #[tokio::test]
    async fn test_ensure_index_is_idempotent() {
        let store = MemoryStore::new();
        store.ensure_index(RecordKind::Sleep).await.unwrap();
        store.ensure_index(RecordKind::Sleep).await.unwrap();
        assert!(store.has_index(RecordKind::Sleep));
        assert!(!store.has_index(RecordKind::Weight));
    }

    #[tokio::test]
    async fn test_date_range_includes_datetimes_on_end_day() {
        let store = MemoryStore::new();
        for (id, start) in [(1, "2024-01-01 06:00:00"), (2, "2024-01-31 18:00:00"), (3, "2024-02-01 06:00:00")] {
            store
                .upsert(RecordKind::Activity, &id.to_string(), &json!({"activityId": id, "startTimeGMT": start}))
                .await
                .unwrap();
        }

        let docs = store
            .query_by_date_range(RecordKind::Activity, "2024-01-01", "2024-01-31")
            .await
            .unwrap();
        let ids: Vec<_> = docs.iter().map(|d| d["activityId"].as_i64().unwrap()).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_disconnect_after_budget() {
        let store = MemoryStore::new();
        store.disconnect_after(1);
        let doc = json!({"calendarDate": "2024-01-01"});

        store.upsert(RecordKind::Sleep, "2024-01-01", &doc).await.unwrap();
        let err = store.upsert(RecordKind::Sleep, "2024-01-02", &doc).await.unwrap_err();
        assert!(err.is_fatal());
        assert!(store.count(RecordKind::Sleep).await.is_err());
    }

    #[tokio::test]
    async fn test_rejected_key_is_recoverable() {
        let store = MemoryStore::new();
        store.reject_key(RecordKind::Sleep, "2024-01-01");
        let err = store
            .upsert(RecordKind::Sleep, "2024-01-01", &json!({}))
            .await
            .unwrap_err();
        assert!(!err.is_fatal());
    }

    #[tokio::test]
    async fn test_aggregate_through_store() {
        let store = MemoryStore::new();
        for (date, rhr) in [("2024-01-01", 50), ("2024-01-02", 54), ("2024-02-01", 48)] {
            store
                .upsert(
                    RecordKind::RestingHeartRate,
                    date,
                    &json!({"calendarDate": date, "restingHeartRate": rhr}),
                )
                .await
                .unwrap();
        }

        let spec = AggregateSpec::reduce(GroupBy::Month, AggregateOp::Avg, "restingHeartRate")
            .between("2024-01-01", "2024-01-31");
        let rows = store.aggregate(RecordKind::RestingHeartRate, &spec).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].group, "2024-01");
        assert_eq!(rows[0].value, Some(52.0));
    }
}
