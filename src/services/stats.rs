// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-kind store statistics: document counts and covered date range.

use serde::Serialize;

use crate::db::{AggregateSpec, DocumentStore, GroupBy, StoreError};
use crate::models::RecordKind;

/// What the store holds for one kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KindStats {
    pub kind: RecordKind,
    pub count: u64,
    /// Earliest day with a record.
    pub first_date: Option<String>,
    /// Latest day with a record.
    pub last_date: Option<String>,
}

/// Count and date range for each of `kinds`.
pub async fn collect<S: DocumentStore>(
    store: &S,
    kinds: &[RecordKind],
) -> Result<Vec<KindStats>, StoreError> {
    let mut stats = Vec::with_capacity(kinds.len());
    for &kind in kinds {
        let count = store.count(kind).await?;
        let days = store
            .aggregate(kind, &AggregateSpec::count_by(GroupBy::Day))
            .await?;
        stats.push(KindStats {
            kind,
            count,
            first_date: days.first().map(|row| row.group.clone()),
            last_date: days.last().map(|row| row.group.clone()),
        });
    }
    Ok(stats)
}
