// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting and validation.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

const CALENDAR_DATE: &str = "%Y-%m-%d";

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Format a date as `YYYY-MM-DD`.
pub fn format_calendar_date(date: NaiveDate) -> String {
    date.format(CALENDAR_DATE).to_string()
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_calendar_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), CALENDAR_DATE).ok()
}

/// Zero-padded `YYYY-MM-DD` form of a date string. chrono also accepts
/// `2024-1-5`; normalizing keeps one spelling per calendar day.
pub fn canonical_calendar_date(s: &str) -> Option<String> {
    parse_calendar_date(s).map(format_calendar_date)
}

/// Accepts RFC3339 and Garmin's zone-less `YYYY-MM-DD HH:MM:SS[.f]`
/// (space or `T` separated). The date part must be zero-padded.
pub fn is_datetime(s: &str) -> bool {
    let s = s.trim();
    let padded_date = s
        .get(..10)
        .is_some_and(|date| canonical_calendar_date(date).as_deref() == Some(date));
    if !padded_date {
        return false;
    }

    DateTime::parse_from_rfc3339(s).is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f").is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
}

/// UTC calendar date of an epoch-milliseconds timestamp.
pub fn date_from_epoch_millis(millis: i64) -> Option<String> {
    DateTime::from_timestamp_millis(millis).map(|dt| format_calendar_date(dt.date_naive()))
}
