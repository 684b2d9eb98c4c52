// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data kinds handled by the pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One kind of health data downloaded from Garmin Connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RecordKind {
    DailySummary,
    Activity,
    Sleep,
    Weight,
    RestingHeartRate,
}

impl RecordKind {
    /// Every kind, in the order a full import processes them.
    pub const ALL: [RecordKind; 5] = [
        RecordKind::Activity,
        RecordKind::Weight,
        RecordKind::DailySummary,
        RecordKind::Sleep,
        RecordKind::RestingHeartRate,
    ];

    /// Field holding the natural key in stored documents.
    pub fn key_field(self) -> &'static str {
        match self {
            RecordKind::DailySummary | RecordKind::Sleep | RecordKind::RestingHeartRate => {
                "calendarDate"
            }
            RecordKind::Activity => "activityId",
            RecordKind::Weight => "date",
        }
    }

    /// Field used for date range queries and time-bucketed aggregation.
    pub fn date_field(self) -> &'static str {
        match self {
            RecordKind::Activity => "startTimeGMT",
            other => other.key_field(),
        }
    }

    /// Object wrapping the record's fields in the "details" payload shape.
    pub fn details_wrapper(self) -> &'static str {
        match self {
            RecordKind::DailySummary => "dailySummaryDTO",
            RecordKind::Activity => "summaryDTO",
            RecordKind::Sleep => "dailySleepDTO",
            RecordKind::Weight => "weightDTO",
            RecordKind::RestingHeartRate => "restingHeartRateDTO",
        }
    }

    /// Container key of multi-record files (e.g. a weight date range).
    pub fn list_container(self) -> Option<&'static str> {
        match self {
            RecordKind::Weight => Some("dateWeightList"),
            _ => None,
        }
    }

    /// Staging directory name.
    pub fn staging_dir(self) -> &'static str {
        match self {
            RecordKind::DailySummary => "daily_summary",
            RecordKind::Activity => "activities",
            RecordKind::Sleep => "sleep",
            RecordKind::Weight => "weight",
            RecordKind::RestingHeartRate => "rhr",
        }
    }

    /// Short name used on the command line and in configuration.
    pub fn as_str(self) -> &'static str {
        match self {
            RecordKind::DailySummary => "daily_summary",
            RecordKind::Activity => "activities",
            RecordKind::Sleep => "sleep",
            RecordKind::Weight => "weight",
            RecordKind::RestingHeartRate => "rhr",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordKind::DailySummary => "DailySummary",
            RecordKind::Activity => "Activity",
            RecordKind::Sleep => "Sleep",
            RecordKind::Weight => "Weight",
            RecordKind::RestingHeartRate => "RestingHeartRate",
        };
        f.write_str(name)
    }
}

/// Error parsing a kind name.
#[derive(Debug, thiserror::Error)]
#[error("Unknown data kind: {0}")]
pub struct UnknownKind(pub String);

impl FromStr for RecordKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily_summary" | "dailysummary" | "monitoring" => Ok(RecordKind::DailySummary),
            "activities" | "activity" => Ok(RecordKind::Activity),
            "sleep" => Ok(RecordKind::Sleep),
            "weight" => Ok(RecordKind::Weight),
            "rhr" | "resting_heart_rate" | "restingheartrate" => Ok(RecordKind::RestingHeartRate),
            other => Err(UnknownKind(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kind_aliases() {
        assert_eq!("rhr".parse::<RecordKind>().unwrap(), RecordKind::RestingHeartRate);
        assert_eq!("Activities".parse::<RecordKind>().unwrap(), RecordKind::Activity);
        assert_eq!("monitoring".parse::<RecordKind>().unwrap(), RecordKind::DailySummary);
        assert!("steps".parse::<RecordKind>().is_err());
    }

    #[test]
    fn test_as_str_round_trips() {
        for kind in RecordKind::ALL {
            assert_eq!(kind.as_str().parse::<RecordKind>().unwrap(), kind);
        }
    }
}
