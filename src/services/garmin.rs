// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Garmin Connect API client for fetching raw wellness and activity data.
//!
//! Handles:
//! - Day-keyed kinds (daily summary, sleep, resting heart rate), one request per day
//! - Weigh-ins over a date range
//! - Paged activity search plus per-activity details
//!
//! Login is out of scope: the client is handed an already issued bearer token.
//! No retries; the caller decides what a failed kind means.

use chrono::NaiveDate;
use serde_json::Value;
use std::time::Duration;

use crate::config::{Config, ConfigError};
use crate::models::RecordKind;
use crate::normalize::split_payloads;
use crate::time_utils::{canonical_calendar_date, date_from_epoch_millis, format_calendar_date};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_PAGE_SIZE: u32 = 100;

const DAILY_SUMMARY_PATH: &str = "/usersummary-service/usersummary/daily";
const SLEEP_PATH: &str = "/wellness-service/wellness/dailySleepData";
const RHR_PATH: &str = "/userstats-service/wellness/daily";
const WEIGHT_RANGE_PATH: &str = "/weight-service/weight/dateRange";
const ACTIVITY_SEARCH_PATH: &str = "/activitylist-service/activities/search/activities";
const ACTIVITY_PATH: &str = "/activity-service/activity";

/// Fetch failure.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The token was refused; nothing else will work either.
    #[error("Garmin rejected the access token (HTTP {status})")]
    Auth { status: u16 },

    #[error("{0}")]
    Remote(String),
}

/// One raw payload and the staging key it belongs under.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedPayload {
    pub key: String,
    pub payload: Value,
}

/// Garmin Connect API client.
#[derive(Clone)]
pub struct GarminClient {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
    page_size: u32,
}

impl GarminClient {
    pub fn new(base_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Client for the configured endpoint; fails without a token.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let token = config.require_access_token()?;
        Ok(Self::new(config.garmin_base_url.clone(), token))
    }

    /// Activity search page size.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Raw payloads of `kind` for the inclusive range `[start, end]`.
    pub async fn fetch(
        &self,
        kind: RecordKind,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<FetchedPayload>, FetchError> {
        match kind {
            RecordKind::DailySummary | RecordKind::Sleep | RecordKind::RestingHeartRate => {
                self.fetch_daily(kind, start, end).await
            }
            RecordKind::Weight => self.fetch_weights(start, end).await,
            RecordKind::Activity => self.fetch_activity_list(start, end).await,
        }
    }

    /// Full details of one activity, `None` if Garmin has nothing for it.
    pub async fn fetch_activity_details(
        &self,
        activity_id: i64,
    ) -> Result<Option<Value>, FetchError> {
        let path = format!("{}/{}", ACTIVITY_PATH, activity_id);
        self.get_optional(&path, &[]).await
    }

    /// One day of a day-keyed kind, `None` if Garmin has no data for it.
    pub async fn fetch_day(
        &self,
        kind: RecordKind,
        day: NaiveDate,
    ) -> Result<Option<Value>, FetchError> {
        let base = daily_path(kind)
            .ok_or_else(|| FetchError::Remote(format!("{} is not fetched per day", kind)))?;
        let path = format!("{}/{}", base, format_calendar_date(day));
        self.get_optional(&path, &[]).await
    }

    async fn fetch_daily(
        &self,
        kind: RecordKind,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<FetchedPayload>, FetchError> {
        let mut payloads = Vec::new();
        for day in start.iter_days().take_while(|day| *day <= end) {
            let date = format_calendar_date(day);
            match self.fetch_day(kind, day).await? {
                Some(payload) => payloads.push(FetchedPayload { key: date, payload }),
                None => tracing::debug!(%kind, date, "No data for day"),
            }
        }
        Ok(payloads)
    }

    async fn fetch_weights(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<FetchedPayload>, FetchError> {
        let query = [
            ("startDate", format_calendar_date(start)),
            ("endDate", format_calendar_date(end)),
        ];
        let Some(body) = self.get_optional(WEIGHT_RANGE_PATH, &query).await? else {
            return Ok(Vec::new());
        };

        let mut payloads = Vec::new();
        for entry in split_payloads(RecordKind::Weight, body) {
            match weigh_in_date(&entry) {
                Some(key) => payloads.push(FetchedPayload { key, payload: entry }),
                None => tracing::warn!("Skipping weigh-in without a date"),
            }
        }
        Ok(payloads)
    }

    async fn fetch_activity_list(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<FetchedPayload>, FetchError> {
        let mut payloads = Vec::new();
        let mut offset = 0u32;

        loop {
            let query = [
                ("startDate", format_calendar_date(start)),
                ("endDate", format_calendar_date(end)),
                ("start", offset.to_string()),
                ("limit", self.page_size.to_string()),
            ];
            let page = match self.get_optional(ACTIVITY_SEARCH_PATH, &query).await? {
                Some(Value::Array(items)) => items,
                Some(other) => {
                    return Err(FetchError::Remote(format!(
                        "Unexpected activity search response: {}",
                        json_type(&other)
                    )))
                }
                None => Vec::new(),
            };
            let page_len = page.len() as u32;

            for activity in page {
                match activity_id(&activity) {
                    Some(id) => payloads.push(FetchedPayload {
                        key: format!("{}_summary", id),
                        payload: activity,
                    }),
                    None => tracing::warn!("Skipping activity without activityId"),
                }
            }

            if page_len < self.page_size {
                break;
            }
            offset += page_len;
        }

        tracing::debug!(count = payloads.len(), "Fetched activity list");
        Ok(payloads)
    }

    /// GET a JSON body. HTTP 204, an empty body or a JSON `null` mean no data.
    async fn get_optional(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Option<Value>, FetchError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(query)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| FetchError::Remote(format!("Request to {} failed: {}", path, e)))?;

        let response = check_response(response).await?;
        if response.status() == reqwest::StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Remote(format!("Reading {} failed: {}", path, e)))?;
        if body.trim().is_empty() {
            return Ok(None);
        }

        match serde_json::from_str(&body) {
            Ok(Value::Null) => Ok(None),
            Ok(value) => Ok(Some(value)),
            Err(e) => Err(FetchError::Remote(format!("Invalid JSON from {}: {}", path, e))),
        }
    }
}

/// Endpoint of a kind fetched one request per day.
pub fn daily_path(kind: RecordKind) -> Option<&'static str> {
    match kind {
        RecordKind::DailySummary => Some(DAILY_SUMMARY_PATH),
        RecordKind::Sleep => Some(SLEEP_PATH),
        RecordKind::RestingHeartRate => Some(RHR_PATH),
        RecordKind::Weight | RecordKind::Activity => None,
    }
}

/// Check response status and return error if not successful.
async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, FetchError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if matches!(status.as_u16(), 401 | 403) {
        tracing::warn!(status = status.as_u16(), "Garmin rejected access token");
        return Err(FetchError::Auth {
            status: status.as_u16(),
        });
    }

    let body = response.text().await.unwrap_or_default();
    Err(FetchError::Remote(format!("HTTP {}: {}", status, body)))
}

/// `activityId` of a summary or details payload.
pub fn activity_id(payload: &Value) -> Option<i64> {
    match payload.get("activityId")? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Staging key of a weigh-in: its calendar date, else the UTC date of the
/// epoch-millisecond `date`.
fn weigh_in_date(entry: &Value) -> Option<String> {
    let staging_key = |date: &str| canonical_calendar_date(date).unwrap_or_else(|| date.to_string());
    if let Some(date) = entry.get("calendarDate").and_then(Value::as_str) {
        return Some(staging_key(date));
    }
    match entry.get("date")? {
        Value::String(s) => Some(staging_key(s)),
        value => date_from_epoch_millis(value.as_i64()?),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_activity_id_forms() {
        assert_eq!(activity_id(&json!({"activityId": 42})), Some(42));
        assert_eq!(activity_id(&json!({"activityId": "43"})), Some(43));
        assert_eq!(activity_id(&json!({"activityId": null})), None);
        assert_eq!(activity_id(&json!({})), None);
    }

    #[test]
    fn test_weigh_in_date() {
        assert_eq!(
            weigh_in_date(&json!({"calendarDate": "2024-03-02", "date": 1_709_278_200_000i64})),
            Some("2024-03-02".to_string())
        );
        assert_eq!(
            weigh_in_date(&json!({"date": 1_709_278_200_000i64})),
            Some("2024-03-01".to_string())
        );
        assert_eq!(weigh_in_date(&json!({"weight": 80000.0})), None);
    }
}
