// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Canonical record: the normalized form of any supported kind.

use serde_json::Value;

use crate::models::{Activity, DailySummary, RecordKind, RestingHeartRate, Sleep, Weight};

/// A validated record ready to be upserted, tagged by kind.
#[derive(Debug, Clone, PartialEq)]
pub enum CanonicalRecord {
    DailySummary(DailySummary),
    Activity(Activity),
    Sleep(Sleep),
    Weight(Weight),
    RestingHeartRate(RestingHeartRate),
}

impl CanonicalRecord {
    pub fn kind(&self) -> RecordKind {
        match self {
            CanonicalRecord::DailySummary(_) => RecordKind::DailySummary,
            CanonicalRecord::Activity(_) => RecordKind::Activity,
            CanonicalRecord::Sleep(_) => RecordKind::Sleep,
            CanonicalRecord::Weight(_) => RecordKind::Weight,
            CanonicalRecord::RestingHeartRate(_) => RecordKind::RestingHeartRate,
        }
    }

    /// Natural key as a string (document ID).
    pub fn natural_key(&self) -> String {
        match self {
            CanonicalRecord::DailySummary(r) => r.calendar_date.clone(),
            CanonicalRecord::Activity(r) => r.activity_id.to_string(),
            CanonicalRecord::Sleep(r) => r.calendar_date.clone(),
            CanonicalRecord::Weight(r) => r.date.clone(),
            CanonicalRecord::RestingHeartRate(r) => r.calendar_date.clone(),
        }
    }

    /// Calendar date (`YYYY-MM-DD`) the record belongs to.
    pub fn record_date(&self) -> &str {
        match self {
            CanonicalRecord::DailySummary(r) => &r.calendar_date,
            CanonicalRecord::Activity(r) => r.start_date(),
            CanonicalRecord::Sleep(r) => &r.calendar_date,
            CanonicalRecord::Weight(r) => &r.date,
            CanonicalRecord::RestingHeartRate(r) => &r.calendar_date,
        }
    }

    /// Whether documents of this record keep the full source payload under
    /// `rawData`. Activities and daily summaries carry far more than the
    /// typed fields.
    pub fn keeps_raw_data(&self) -> bool {
        matches!(
            self,
            CanonicalRecord::Activity(_) | CanonicalRecord::DailySummary(_)
        )
    }

    /// Serialize into a store document stamped with `importedAt`. `raw` is
    /// the payload the record was normalized from.
    pub fn to_document(&self, imported_at: &str, raw: &Value) -> Result<Value, serde_json::Error> {
        let mut document = match self {
            CanonicalRecord::DailySummary(r) => serde_json::to_value(r)?,
            CanonicalRecord::Activity(r) => serde_json::to_value(r)?,
            CanonicalRecord::Sleep(r) => serde_json::to_value(r)?,
            CanonicalRecord::Weight(r) => serde_json::to_value(r)?,
            CanonicalRecord::RestingHeartRate(r) => serde_json::to_value(r)?,
        };

        if let Value::Object(map) = &mut document {
            map.insert(
                "importedAt".to_string(),
                Value::String(imported_at.to_string()),
            );
            if self.keeps_raw_data() {
                map.insert("rawData".to_string(), raw.clone());
            }
        }

        Ok(document)
    }
}
