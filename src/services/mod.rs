// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - download, import and reporting workflows.

pub mod download;
pub mod garmin;
pub mod import;
pub mod stats;

pub use download::{DownloadMode, DownloadReport, Downloader};
pub use garmin::{FetchError, FetchedPayload, GarminClient};
pub use import::{AbortCause, ImportAborted, ImportEngine, ImportRequest, RunState};
pub use stats::KindStats;
