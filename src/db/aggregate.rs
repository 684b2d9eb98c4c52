//! Grouped aggregation over stored documents.
//!
//! Firestore has no aggregation pipeline, so grouping runs in-process over
//! the documents of a date range, the same way for every store.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::models::RecordKind;

/// How documents are grouped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupBy {
    /// One group for everything.
    All,
    Day,
    /// "YYYY-MM"
    Month,
    /// "YYYY"
    Year,
    /// Value of a document field, e.g. `activityType`.
    Field(String),
}

/// Reduction applied to the metric field within each group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateOp {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

/// Aggregation request, the equivalent of a small pipeline:
/// `match(date range) -> group(group_by) -> reduce(op, metric)`.
#[derive(Debug, Clone)]
pub struct AggregateSpec {
    pub group_by: GroupBy,
    pub op: AggregateOp,
    /// Numeric field reduced by `op` (ignored for `Count`).
    pub metric: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

impl AggregateSpec {
    pub fn count_by(group_by: GroupBy) -> Self {
        Self {
            group_by,
            op: AggregateOp::Count,
            metric: None,
            start: None,
            end: None,
        }
    }

    pub fn reduce(group_by: GroupBy, op: AggregateOp, metric: &str) -> Self {
        Self {
            group_by,
            op,
            metric: Some(metric.to_string()),
            start: None,
            end: None,
        }
    }

    pub fn between(mut self, start: &str, end: &str) -> Self {
        self.start = Some(start.to_string());
        self.end = Some(end.to_string());
        self
    }

    /// Date range to query; open ends cover every stored date.
    pub fn bounds(&self) -> (String, String) {
        (
            self.start.clone().unwrap_or_default(),
            self.end.clone().unwrap_or_else(|| "9999-12-31".to_string()),
        )
    }

    /// Group and reduce `documents` of `kind`. Rows are sorted by group key.
    pub fn apply(&self, kind: RecordKind, documents: &[Value]) -> Vec<AggregateRow> {
        let mut groups: BTreeMap<String, Accumulator> = BTreeMap::new();

        for doc in documents {
            let Some(group) = self.group_key(kind, doc) else {
                continue;
            };
            let value = self
                .metric
                .as_deref()
                .and_then(|field| doc.get(field))
                .and_then(Value::as_f64);
            groups.entry(group).or_default().add(value);
        }

        groups
            .into_iter()
            .map(|(group, acc)| AggregateRow {
                value: acc.result(self.op),
                count: acc.documents,
                group,
            })
            .collect()
    }

    fn group_key(&self, kind: RecordKind, doc: &Value) -> Option<String> {
        let date = || doc.get(kind.date_field()).and_then(Value::as_str);
        match &self.group_by {
            GroupBy::All => Some("all".to_string()),
            GroupBy::Day => date().and_then(|d| prefix(d, 10)),
            GroupBy::Month => date().and_then(|d| prefix(d, 7)),
            GroupBy::Year => date().and_then(|d| prefix(d, 4)),
            GroupBy::Field(field) => Some(match doc.get(field) {
                None | Some(Value::Null) => "(none)".to_string(),
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
            }),
        }
    }
}

/// Leading `len` characters of an ISO date string, e.g.
/// "2024-01-15T10:30:00Z" -> "2024-01" for 7.
fn prefix(date: &str, len: usize) -> Option<String> {
    date.get(..len).map(str::to_string)
}

/// One group of an aggregation result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow {
    pub group: String,
    /// `None` when no document in the group carried the metric.
    pub value: Option<f64>,
    pub count: u64,
}

#[derive(Debug, Default)]
struct Accumulator {
    documents: u64,
    values: u64,
    sum: f64,
    min: Option<f64>,
    max: Option<f64>,
}

impl Accumulator {
    fn add(&mut self, value: Option<f64>) {
        self.documents += 1;
        // Absent values do not count as zero.
        if let Some(v) = value {
            self.values += 1;
            self.sum += v;
            self.min = Some(self.min.map_or(v, |m| m.min(v)));
            self.max = Some(self.max.map_or(v, |m| m.max(v)));
        }
    }

    fn result(&self, op: AggregateOp) -> Option<f64> {
        match op {
            AggregateOp::Count => Some(self.documents as f64),
            _ if self.values == 0 => None,
            AggregateOp::Sum => Some(self.sum),
            AggregateOp::Avg => Some(self.sum / self.values as f64),
            AggregateOp::Min => self.min,
            AggregateOp::Max => self.max,
        }
    }
}
