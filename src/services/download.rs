// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Download workflow: fetch every enabled kind from Garmin and stage it.
//!
//! 1. Work out the date window per kind (full history or the latest days)
//! 2. Fetch raw payloads
//! 3. Write each payload to staging under its key
//!
//! Day-keyed kinds are staged one day at a time; a day that fails is recorded
//! and the next day is tried. Activities also get their details payload
//! staged next to the summary.

use chrono::{Days, NaiveDate};
use std::collections::BTreeMap;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::RecordKind;
use crate::services::garmin::{activity_id, daily_path, FetchError, FetchedPayload, GarminClient};
use crate::staging::StagingStore;
use crate::time_utils::format_calendar_date;

/// Which window to download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadMode {
    /// From each kind's configured start date through today.
    Full,
    /// Only the most recent `latest_days` days.
    Latest,
}

/// Result of a download run.
#[derive(Debug, Default)]
pub struct DownloadReport {
    /// Files written per kind.
    pub written: BTreeMap<RecordKind, usize>,
    /// Kinds whose fetch failed, with the reason. Other kinds still ran.
    pub failed_kinds: Vec<(RecordKind, String)>,
    /// Single days of day-keyed kinds that failed, with the reason.
    pub failed_days: Vec<(RecordKind, NaiveDate, String)>,
}

impl DownloadReport {
    pub fn total_written(&self) -> usize {
        self.written.values().sum()
    }
}

/// Fetch and stage raw data for the configured kinds.
pub struct Downloader {
    client: GarminClient,
    staging: StagingStore,
    start_dates: BTreeMap<RecordKind, NaiveDate>,
    kinds: Vec<RecordKind>,
    latest_days: u32,
}

impl Downloader {
    pub fn new(client: GarminClient, staging: StagingStore, config: &Config) -> Self {
        Self {
            client,
            staging,
            start_dates: config.start_dates.clone(),
            kinds: config.enabled_kinds.clone(),
            latest_days: config.latest_days,
        }
    }

    /// Date window for `kind`, `None` if it has no start date or starts
    /// after `today`.
    pub fn window(
        &self,
        kind: RecordKind,
        mode: DownloadMode,
        today: NaiveDate,
    ) -> Option<(NaiveDate, NaiveDate)> {
        let start = *self.start_dates.get(&kind)?;
        let start = match mode {
            DownloadMode::Full => start,
            DownloadMode::Latest => {
                let back = u64::from(self.latest_days.saturating_sub(1));
                let recent = today.checked_sub_days(Days::new(back)).unwrap_or(today);
                start.max(recent)
            }
        };
        (start <= today).then_some((start, today))
    }

    /// Download every enabled kind.
    ///
    /// A failed kind is logged and recorded and the run moves on. A rejected
    /// token stops the run since no later request can succeed.
    pub async fn run(
        &self,
        mode: DownloadMode,
        today: NaiveDate,
        cancel: &CancellationToken,
    ) -> Result<DownloadReport> {
        let mut report = DownloadReport::default();

        for &kind in &self.kinds {
            if cancel.is_cancelled() {
                tracing::info!("Download cancelled");
                break;
            }
            let Some((start, end)) = self.window(kind, mode, today) else {
                tracing::debug!(%kind, "No start date configured, skipping");
                continue;
            };

            tracing::info!(%kind, %start, %end, "Downloading");
            let downloaded = if daily_path(kind).is_some() {
                self.download_days(kind, start, end, cancel, &mut report).await
            } else {
                self.download_kind(kind, start, end).await
            };
            match downloaded {
                Ok(written) => {
                    tracing::info!(%kind, written, "Download complete");
                    report.written.insert(kind, written);
                }
                Err(AppError::Fetch(e @ FetchError::Auth { .. })) => {
                    tracing::error!(%kind, error = %e, "Authentication failed, stopping download");
                    return Err(e.into());
                }
                Err(AppError::Fetch(e)) => {
                    tracing::warn!(%kind, error = %e, "Download failed, continuing");
                    report.failed_kinds.push((kind, e.to_string()));
                }
                Err(e) => return Err(e),
            }
        }

        Ok(report)
    }

    /// Fetch and stage each day as it arrives, so an error on one day keeps
    /// the days already written. Only a rejected token stops the kind.
    async fn download_days(
        &self,
        kind: RecordKind,
        start: NaiveDate,
        end: NaiveDate,
        cancel: &CancellationToken,
        report: &mut DownloadReport,
    ) -> Result<usize> {
        let mut written = 0;

        for day in start.iter_days().take_while(|day| *day <= end) {
            if cancel.is_cancelled() {
                break;
            }
            let date = format_calendar_date(day);

            match self.client.fetch_day(kind, day).await {
                Ok(Some(payload)) => {
                    self.staging.write(kind, &date, &payload).await?;
                    written += 1;
                }
                Ok(None) => tracing::debug!(%kind, date, "No data for day"),
                Err(e @ FetchError::Auth { .. }) => return Err(e.into()),
                Err(e) => {
                    tracing::warn!(%kind, date, error = %e, "Day failed, continuing");
                    report.failed_days.push((kind, day, e.to_string()));
                }
            }
        }

        Ok(written)
    }

    async fn download_kind(&self, kind: RecordKind, start: NaiveDate, end: NaiveDate) -> Result<usize> {
        let payloads = self.client.fetch(kind, start, end).await?;
        let mut written = 0;

        for FetchedPayload { key, payload } in payloads {
            self.staging.write(kind, &key, &payload).await?;
            written += 1;

            if kind == RecordKind::Activity {
                written += self.download_activity_details(&payload).await?;
            }
        }

        Ok(written)
    }

    /// Stage `{id}_details` for one activity summary. Returns files written.
    async fn download_activity_details(&self, summary: &serde_json::Value) -> Result<usize> {
        let Some(id) = activity_id(summary) else {
            return Ok(0);
        };

        match self.client.fetch_activity_details(id).await {
            Ok(Some(details)) => {
                self.staging
                    .write(RecordKind::Activity, &format!("{}_details", id), &details)
                    .await?;
                Ok(1)
            }
            Ok(None) => Ok(0),
            Err(e @ FetchError::Auth { .. }) => Err(e.into()),
            Err(e) => {
                // The summary alone is still importable.
                tracing::warn!(activity_id = id, error = %e, "Activity details unavailable");
                Ok(0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn downloader(start: Option<NaiveDate>, latest_days: u32) -> Downloader {
        let mut config = Config {
            latest_days,
            ..Config::default()
        };
        if let Some(start) = start {
            config.start_dates.insert(RecordKind::Sleep, start);
        }
        Downloader::new(
            GarminClient::new("http://localhost:1", "token"),
            StagingStore::new("unused"),
            &config,
        )
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_window_full_and_latest() {
        let today = day(2024, 3, 31);
        let d = downloader(Some(day(2024, 1, 1)), 30);

        assert_eq!(
            d.window(RecordKind::Sleep, DownloadMode::Full, today),
            Some((day(2024, 1, 1), today))
        );
        assert_eq!(
            d.window(RecordKind::Sleep, DownloadMode::Latest, today),
            Some((day(2024, 3, 2), today))
        );
        assert_eq!(d.window(RecordKind::Weight, DownloadMode::Full, today), None);
    }

    #[test]
    fn test_window_latest_never_precedes_start() {
        let today = day(2024, 3, 31);
        let d = downloader(Some(day(2024, 3, 20)), 30);
        assert_eq!(
            d.window(RecordKind::Sleep, DownloadMode::Latest, today),
            Some((day(2024, 3, 20), today))
        );
    }

    #[test]
    fn test_window_future_start_is_skipped() {
        let d = downloader(Some(day(2025, 1, 1)), 30);
        assert_eq!(d.window(RecordKind::Sleep, DownloadMode::Full, day(2024, 3, 31)), None);
    }
}
