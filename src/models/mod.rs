// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activity;
pub mod kind;
pub mod record;
pub mod stats;
pub mod wellness;

pub use activity::Activity;
pub use kind::RecordKind;
pub use record::CanonicalRecord;
pub use stats::{FailureSample, ImportReport, KindTally, RunOutcome};
pub use wellness::{DailySummary, RestingHeartRate, Sleep, Weight};
